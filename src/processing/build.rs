//! Value construction for target fields.

use crate::types::UserEntity;

/// Build one [`UserEntity`] per code, preserving order and count.
///
/// No de-duplication happens here. Entities carry only `code`; `name` is left unset and is
/// therefore omitted when serialized.
pub fn build_selection<S: AsRef<str>>(codes: &[S]) -> Vec<UserEntity> {
    codes.iter().map(|code| UserEntity::new(code.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::build_selection;
    use serde_json::json;

    #[test]
    fn one_entity_per_code_in_order() {
        let out = build_selection(&["u3", "u1", "u2"]);
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().map(|e| e.code()).collect::<Vec<_>>(),
            vec!["u3", "u1", "u2"]
        );
        assert!(out.iter().all(|e| e.name.is_none()));
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(build_selection::<String>(&[]).is_empty());
    }

    #[test]
    fn serialized_entities_have_no_name() {
        let out = build_selection(&["u1".to_string()]);
        assert_eq!(out[0].to_json(), json!({"code": "u1"}));
    }
}
