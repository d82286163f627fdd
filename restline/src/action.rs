//! The closed set of data operations the pipeline dispatches on

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The data operation carried out by one request.
///
/// The set is closed: dispatch in [`Model::execute`](crate::resource::Model::execute)
/// is an exhaustive match, so every constructed action maps to exactly
/// one storage operation. Unknown tokens are rejected at parse time by
/// [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a single document
    InsertOne,
    /// Create a batch of documents
    InsertMany,
    /// Update a document selected by the request
    Update,
    /// Create a document, or update it if it already exists
    Upsert,
    /// Return a single document
    FindOne,
    /// List documents
    FindMany,
    /// Delete a document selected by the request
    Remove,
}

impl Action {
    /// All seven actions, in dispatch order.
    pub const ALL: [Action; 7] = [
        Action::InsertOne,
        Action::InsertMany,
        Action::Update,
        Action::Upsert,
        Action::FindOne,
        Action::FindMany,
        Action::Remove,
    ];

    /// The wire token for this action, as it appears in event names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsertOne => "insertOne",
            Self::InsertMany => "insertMany",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::FindOne => "findOne",
            Self::FindMany => "findMany",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "insertOne" => Ok(Self::InsertOne),
            "insertMany" => Ok(Self::InsertMany),
            "update" => Ok(Self::Update),
            "upsert" => Ok(Self::Upsert),
            "findOne" => Ok(Self::FindOne),
            "findMany" => Ok(Self::FindMany),
            "remove" => Ok(Self::Remove),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_token_is_rejected_with_a_descriptive_error() {
        let err = "deleteEverything".parse::<Action>().unwrap_err();
        assert!(matches!(err, Error::UnknownAction(ref token) if token == "deleteEverything"));
        assert!(err.to_string().contains("insertOne"));
    }

    #[test]
    fn snake_case_tokens_are_not_accepted() {
        assert!("insert_one".parse::<Action>().is_err());
    }
}
