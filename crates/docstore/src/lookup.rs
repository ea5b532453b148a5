// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Outcomes of id-addressed reads and deletes.

/// The outcome of looking up a single document by id.
///
/// Absence is an ordinary outcome rather than an error, so callers branch on the
/// variant instead of inspecting error types.
///
/// # Examples
///
/// ```
/// use docstore::Lookup;
///
/// let hit = Lookup::Found(7);
/// assert!(hit.is_found());
/// assert_eq!(hit.found(), Some(7));
///
/// let miss: Lookup<i32> = Lookup::NotFound;
/// assert_eq!(miss.found(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The document exists.
    Found(T),
    /// No document with the requested id exists.
    NotFound,
}

impl<T> Lookup<T> {
    /// Returns `true` for [`Lookup::Found`].
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Converts the lookup into an `Option`.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// The outcome of deleting a single document by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The document existed and was deleted.
    Deleted,
    /// No document with the requested id existed.
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_from_option() {
        assert_eq!(Lookup::from(Some("doc")), Lookup::Found("doc"));
        assert_eq!(Lookup::<&str>::from(None), Lookup::NotFound);
    }
}
