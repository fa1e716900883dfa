//! Field-level helpers for partial updates.
//!
//! A patch payload carries `Option` per field; `Some` overwrites the stored
//! value, `None` (absent or null in the request body) keeps it. The same
//! rules apply to every entity that supports PATCH.

/// Overwrite a nullable field when the patch supplies a value.
pub fn apply<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

/// Overwrite a non-nullable field when the patch supplies a value.
pub fn apply_required<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_existing_value_when_absent() {
        let mut field = Some("old".to_string());
        apply(&mut field, &None);
        assert_eq!(field.as_deref(), Some("old"));
    }

    #[test]
    fn apply_overwrites_when_present() {
        let mut field = Some("old".to_string());
        apply(&mut field, &Some("new".to_string()));
        assert_eq!(field.as_deref(), Some("new"));

        let mut unset: Option<i32> = None;
        apply(&mut unset, &Some(7));
        assert_eq!(unset, Some(7));
    }

    #[test]
    fn apply_required_only_replaces_on_some() {
        let mut field = 3;
        apply_required(&mut field, &None);
        assert_eq!(field, 3);
        apply_required(&mut field, &Some(9));
        assert_eq!(field, 9);
    }
}
