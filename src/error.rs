// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Errors raised while building trees, reading options or reprojecting
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The record list handed to a fallible entry point is not an array.
    InvalidInput,
    /// Strict mode: two records share the same id.
    DuplicateId(String),
    /// Strict mode: a record points at a parent id that no record carries.
    DanglingParent { id: String, pid: String },
    /// Strict mode: a record lacks the configured id or parent id field.
    MissingField(String),

    MalformedJson,
    ExpectedStringValue,
    ExpectedBoolValue,
    ExpectedObjectValue,
    UnknownStrategy(String),
    UnknownOrphanPolicy(String),

    UnsupportedCrs(String),
    PositionExpectedTwoValues,
    BboxExpectedFourValues,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::InvalidInput => write!(f, "data is not an array."),
            Error::DuplicateId(ref id) => {
                write!(f, "Encountered more than one record with id '{}'.", id)
            }
            Error::DanglingParent { ref id, ref pid } => write!(
                f,
                "Record '{}' refers to parent '{}', which matches no record.",
                id, pid,
            ),
            Error::MissingField(ref name) => {
                write!(f, "Encountered a record without the '{}' field.", name)
            }
            Error::MalformedJson => write!(f, "Encountered malformed JSON."),
            Error::ExpectedStringValue => write!(f, "Expected a string value."),
            Error::ExpectedBoolValue => write!(f, "Expected a boolean value."),
            Error::ExpectedObjectValue => write!(f, "Expected an object."),
            Error::UnknownStrategy(ref s) => write!(
                f,
                "Unknown tree strategy '{}', expected 'indexed' or 'recursive'.",
                s
            ),
            Error::UnknownOrphanPolicy(ref s) => write!(
                f,
                "Unknown orphan policy '{}', expected 'discard' or 'promote'.",
                s
            ),
            Error::UnsupportedCrs(ref code) => {
                write!(f, "Unsupported coordinate reference system '{}'.", code)
            }
            Error::PositionExpectedTwoValues => {
                write!(f, "A position must have at least two values.")
            }
            Error::BboxExpectedFourValues => {
                write!(f, "Only two-dimensional 'bbox' arrays of four values are supported.")
            }
        }
    }
}

impl std::error::Error for Error {}
