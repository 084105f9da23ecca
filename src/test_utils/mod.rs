#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{assert_allow_header, assert_error_message};
