//! Static policy page model.

use serde::Serialize;

/// A titled block of a policy page.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySection {
    pub heading: &'static str,
    pub body: &'static str,
}

/// A static page such as the privacy policy or terms of use.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub last_updated: &'static str,
    pub sections: Vec<PolicySection>,
}
