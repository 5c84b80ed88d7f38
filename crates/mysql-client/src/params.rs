//! Statement parameters.
//!
//! A statement takes either no parameters, a positional list bound to `?`
//! (or `%s`) placeholders, or a named list bound to `:name` (or
//! `%(name)s`) placeholders.
//!
//! ```rust,ignore
//! use mysql_pool_client::Params;
//!
//! let positional = Params::positional(&[&"John Doe", &30]);
//! let named = Params::named(&[("name", &"John Doe"), ("age", &30)]);
//! ```

use mysql_pool_types::{SqlValue, ToSql};

/// A named query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// Parameter name (without `:` prefix).
    pub name: String,
    /// Parameter value.
    pub value: SqlValue,
}

impl NamedParam {
    /// Create a new named parameter.
    pub fn new<S: Into<String>>(name: S, value: SqlValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Create a named parameter from a value implementing ToSql.
    pub fn from_value<S: Into<String>, T: ToSql + ?Sized>(name: S, value: &T) -> Self {
        Self {
            name: name.into(),
            value: value.to_sql(),
        }
    }
}

/// Trait for types that can be converted to named query parameters.
///
/// # Example
///
/// ```rust,ignore
/// use mysql_pool_client::{NamedParam, Params, ToParams};
///
/// struct NewUser {
///     name: String,
///     age: i32,
/// }
///
/// impl ToParams for NewUser {
///     fn to_params(&self) -> Vec<NamedParam> {
///         vec![
///             NamedParam::from_value("name", &self.name),
///             NamedParam::from_value("age", &self.age),
///         ]
///     }
/// }
///
/// let params = Params::from_struct(&user);
/// ```
pub trait ToParams {
    /// Convert this struct to a vector of named parameters.
    fn to_params(&self) -> Vec<NamedParam>;
}

/// Parameters bound to a single statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// Values bound to positional placeholders, in order.
    Positional(Vec<SqlValue>),
    /// Values bound to named placeholders.
    Named(Vec<NamedParam>),
}

impl Params {
    /// Build positional parameters from a slice of values.
    pub fn positional(values: &[&(dyn ToSql + Sync)]) -> Self {
        if values.is_empty() {
            return Self::None;
        }
        Self::Positional(values.iter().map(|v| v.to_sql()).collect())
    }

    /// Build named parameters from `(name, value)` pairs.
    pub fn named(values: &[(&str, &(dyn ToSql + Sync))]) -> Self {
        if values.is_empty() {
            return Self::None;
        }
        Self::Named(
            values
                .iter()
                .map(|(name, value)| NamedParam::from_value(*name, *value))
                .collect(),
        )
    }

    /// Build named parameters from a struct.
    pub fn from_struct<T: ToParams + ?Sized>(value: &T) -> Self {
        let params = value.to_params();
        if params.is_empty() {
            Self::None
        } else {
            Self::Named(params)
        }
    }

    /// Check whether no values are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Positional(values) => values.is_empty(),
            Self::Named(values) => values.is_empty(),
        }
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Positional(values) => values.len(),
            Self::Named(values) => values.len(),
        }
    }

    /// Look up a named parameter.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&SqlValue> {
        match self {
            Self::Named(values) => values.iter().find(|p| p.name == name).map(|p| &p.value),
            _ => None,
        }
    }
}

impl From<()> for Params {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        if values.is_empty() {
            Self::None
        } else {
            Self::Positional(values)
        }
    }
}

impl From<Vec<NamedParam>> for Params {
    fn from(values: Vec<NamedParam>) -> Self {
        if values.is_empty() {
            Self::None
        } else {
            Self::Named(values)
        }
    }
}

impl From<&Params> for Params {
    fn from(params: &Params) -> Self {
        params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NewUser {
        name: String,
        age: i32,
    }

    impl ToParams for NewUser {
        fn to_params(&self) -> Vec<NamedParam> {
            vec![
                NamedParam::from_value("name", &self.name),
                NamedParam::from_value("age", &self.age),
            ]
        }
    }

    #[test]
    fn test_positional() {
        let params = Params::positional(&[&"John Doe", &30, &None::<i32>]);
        assert_eq!(
            params,
            Params::Positional(vec![
                SqlValue::String("John Doe".into()),
                SqlValue::Int(30),
                SqlValue::Null,
            ])
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_named_lookup() {
        let params = Params::named(&[("name", &"Ada"), ("age", &30)]);
        assert_eq!(params.get_named("age"), Some(&SqlValue::Int(30)));
        assert_eq!(params.get_named("email"), None);
    }

    #[test]
    fn test_empty_collapses_to_none() {
        assert_eq!(Params::positional(&[]), Params::None);
        assert_eq!(Params::named(&[]), Params::None);
        assert_eq!(Params::from(()), Params::None);
        assert_eq!(Params::from(Vec::<SqlValue>::new()), Params::None);
        assert!(Params::default().is_empty());
    }

    #[test]
    fn test_from_struct() {
        let user = NewUser {
            name: "Ada".into(),
            age: 30,
        };
        let params = Params::from_struct(&user);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get_named("name"), Some(&SqlValue::String("Ada".into())));
    }
}
