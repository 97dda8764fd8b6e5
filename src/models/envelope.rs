//! Collection envelopes returned by list endpoints.

use serde::Deserialize;

/// A list endpoint answers either with a bare array or with `{"results": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Enveloped { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Enveloped { results } => results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_enveloped_lists_decode_alike() {
        let bare: ListResponse<u32> = serde_json::from_str("[1, 2]").unwrap();
        let wrapped: ListResponse<u32> = serde_json::from_str(r#"{"results": [1, 2]}"#).unwrap();

        assert_eq!(bare.into_items(), vec![1, 2]);
        assert_eq!(wrapped.into_items(), vec![1, 2]);
    }

    #[test]
    fn test_unknown_envelope_is_rejected() {
        let parsed = serde_json::from_str::<ListResponse<u32>>(r#"{"items": [1]}"#);
        assert!(parsed.is_err());
    }
}
