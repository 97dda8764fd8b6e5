//! Static policy pages.

use once_cell::sync::Lazy;

use crate::models::{PolicyPage, PolicySection};

static POLICY_PAGES: Lazy<Vec<PolicyPage>> = Lazy::new(|| {
    vec![
        PolicyPage {
            slug: "privacy",
            title: "Privacy Policy",
            last_updated: "2024-03-01",
            sections: vec![
                PolicySection {
                    heading: "What we collect",
                    body: "Your email address when you subscribe, and the name and text \
                           you provide when you comment. Nothing else is stored.",
                },
                PolicySection {
                    heading: "How we use it",
                    body: "Subscriber addresses receive the newsletter and nothing more. \
                           Comments are shown publicly alongside the article they belong to.",
                },
                PolicySection {
                    heading: "Your choices",
                    body: "Every newsletter carries an unsubscribe link. Write to the editors \
                           to have a comment removed.",
                },
            ],
        },
        PolicyPage {
            slug: "terms",
            title: "Terms of Use",
            last_updated: "2024-03-01",
            sections: vec![
                PolicySection {
                    heading: "Content",
                    body: "All articles, photographs and illustrations remain the property \
                           of their creators and may not be republished without permission.",
                },
                PolicySection {
                    heading: "Accounts and access",
                    body: "Reading is free. Administrative access is limited to the \
                           editorial team.",
                },
            ],
        },
        PolicyPage {
            slug: "community-guidelines",
            title: "Community Guidelines",
            last_updated: "2024-05-12",
            sections: vec![
                PolicySection {
                    heading: "Be kind",
                    body: "Disagree with ideas, not people. Personal attacks are removed.",
                },
                PolicySection {
                    heading: "Stay on topic",
                    body: "Comments should respond to the piece they sit under. Keep them \
                           under 2000 characters.",
                },
                PolicySection {
                    heading: "Moderation",
                    body: "Moderators may hide or remove comments that break these rules.",
                },
            ],
        },
        PolicyPage {
            slug: "submissions",
            title: "Submission Guidelines",
            last_updated: "2024-01-20",
            sections: vec![
                PolicySection {
                    heading: "What we publish",
                    body: "Essays, reportage, fiction under 5000 words and photo series.",
                },
                PolicySection {
                    heading: "How to pitch",
                    body: "Send a short pitch and two writing samples. We reply within \
                           six weeks.",
                },
            ],
        },
    ]
});

/// Every static policy page, in navigation order.
pub fn policy_pages() -> &'static [PolicyPage] {
    &POLICY_PAGES
}

pub fn find_page(slug: &str) -> Option<&'static PolicyPage> {
    POLICY_PAGES.iter().find(|p| p.slug == slug)
}
