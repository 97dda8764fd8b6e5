//! Contributor directory.
//!
//! There is no live endpoint for contributors yet, so the directory is backed by
//! bundled sample data.

use once_cell::sync::Lazy;

use crate::models::{Contributor, SocialLink};

static SAMPLE_CONTRIBUTORS: Lazy<Vec<Contributor>> = Lazy::new(|| {
    vec![
        contributor(
            "amara-okafor",
            "Amara Okafor",
            "Editor-in-Chief",
            Some("Lagos"),
            Some("Edits the magazine and writes the opening letter of every issue."),
            &[("twitter", "https://twitter.com/amaraokafor")],
        ),
        contributor(
            "jonas-weber",
            "Jonas Weber",
            "Staff Writer",
            Some("Berlin"),
            Some("Covers cities, infrastructure and the people who keep both running."),
            &[("website", "https://jonasweber.example")],
        ),
        contributor(
            "lucia-ferreira",
            "Lucía Ferreira",
            "Photographer",
            Some("Lisbon"),
            None,
            &[("instagram", "https://instagram.com/luciaferreira")],
        ),
        contributor(
            "hana-sato",
            "Hana Sato",
            "Illustrator",
            Some("Osaka"),
            Some("Draws the covers and most of the margins."),
            &[],
        ),
        contributor(
            "samuel-reyes",
            "Samuel Reyes",
            "Staff Writer",
            None,
            Some("Long-form essays on food, memory and migration."),
            &[("twitter", "https://twitter.com/samreyes")],
        ),
        contributor(
            "ines-dubois",
            "Inès Dubois",
            "Copy Editor",
            Some("Montréal"),
            None,
            &[],
        ),
    ]
});

fn contributor(
    id: &str,
    name: &str,
    role: &str,
    location: Option<&str>,
    bio: Option<&str>,
    socials: &[(&str, &str)],
) -> Contributor {
    Contributor {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        location: location.map(str::to_string),
        bio: bio.map(str::to_string),
        socials: socials
            .iter()
            .map(|(network, url)| SocialLink {
                network: network.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}

/// The bundled contributor list.
pub fn sample_contributors() -> &'static [Contributor] {
    &SAMPLE_CONTRIBUTORS
}

/// Grid of contributors with simple filtering.
#[derive(Debug, Clone)]
pub struct ContributorDirectory {
    contributors: Vec<Contributor>,
}

impl Default for ContributorDirectory {
    fn default() -> Self {
        Self::new(sample_contributors().to_vec())
    }
}

impl ContributorDirectory {
    pub fn new(contributors: Vec<Contributor>) -> Self {
        Self { contributors }
    }

    pub fn all(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn find(&self, id: &str) -> Option<&Contributor> {
        self.contributors.iter().find(|c| c.id == id)
    }

    pub fn by_role(&self, role: &str) -> Vec<&Contributor> {
        let role = role.trim().to_lowercase();
        self.contributors
            .iter()
            .filter(|c| c.role.to_lowercase() == role)
            .collect()
    }

    /// Distinct roles, sorted.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.contributors.iter().map(|c| c.role.as_str()).collect();
        roles.sort_unstable();
        roles.dedup();
        roles
    }

    /// Case-insensitive match on name, role or location.
    pub fn search(&self, term: &str) -> Vec<&Contributor> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.contributors.iter().collect();
        }
        self.contributors
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&term)
                    || c.role.to_lowercase().contains(&term)
                    || c.location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&term))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_directory() {
        let directory = ContributorDirectory::default();
        assert_eq!(directory.all().len(), 6);
        assert_eq!(
            directory.find("hana-sato").map(|c| c.role.as_str()),
            Some("Illustrator")
        );
        assert!(directory.find("nobody").is_none());
    }

    #[test]
    fn test_by_role_ignores_case() {
        let directory = ContributorDirectory::default();
        let writers = directory.by_role("staff writer");
        let names: Vec<_> = writers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Jonas Weber", "Samuel Reyes"]);
    }

    #[test]
    fn test_roles_are_distinct_and_sorted() {
        let directory = ContributorDirectory::default();
        assert_eq!(
            directory.roles(),
            vec![
                "Copy Editor",
                "Editor-in-Chief",
                "Illustrator",
                "Photographer",
                "Staff Writer"
            ]
        );
    }

    #[test]
    fn test_search_matches_location() {
        let directory = ContributorDirectory::default();
        let found = directory.search("LISBON");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "lucia-ferreira");
        assert_eq!(directory.search("  ").len(), 6);
    }
}
