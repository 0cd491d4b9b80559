#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

/// Registers customer 1 and approves workers 2 and 3, then posts job 1 with a
/// budget of 100.00.
pub const SETUP: [&str; 6] = [
    r#"{"op":"register_user","username":"karim","email":"karim@example.com","is_worker":false,"is_customer":true}"#,
    r#"{"op":"register_user","username":"selim","email":"selim@example.com","is_worker":true,"is_customer":false}"#,
    r#"{"op":"approve_worker","user":2}"#,
    r#"{"op":"register_user","username":"nadia","email":"nadia@example.com","is_worker":true,"is_customer":false}"#,
    r#"{"op":"approve_worker","user":3}"#,
    r#"{"op":"post_job","actor":1,"title":"Fix kitchen sink","description":"Leaking under the counter","location":"Dhaka","budget":"100.00"}"#,
];

/// Both workers bid on job 1 (bids 1 and 2) and the customer picks bid 1.
pub const BID_AND_ASSIGN: [&str; 3] = [
    r#"{"op":"submit_bid","actor":2,"job":1,"amount":"90.50"}"#,
    r#"{"op":"submit_bid","actor":3,"job":1,"amount":"95.00"}"#,
    r#"{"op":"assign_bid","actor":1,"bid":1}"#,
];

pub fn write_requests<'a>(groups: &[&[&'a str]]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in groups.iter().flat_map(|group| group.iter()) {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}
