//! Stateless string helpers
//!
//! Path escaping for date-math index names, query-string term escaping,
//! identifier case conversion and timestamp formatting.

mod case;
mod curl;
mod date;
mod escape;

pub use case::{to_camel_case, to_snake_case};
pub use curl::to_curl_command;
pub use date::{convert_date, DateInput};
pub use escape::{
    escape_date_math, escape_term, is_date_math_escaped, replace_boolean_words,
    replace_boolean_words_and_escape_term,
};
