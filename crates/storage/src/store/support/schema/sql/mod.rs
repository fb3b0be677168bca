#![forbid(unsafe_code)]

mod access;
mod articles;
mod core;
mod engagement;
mod history;
mod indexes;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(articles::SQL);
    sql.push_str(access::SQL);
    sql.push_str(engagement::SQL);
    sql.push_str(history::SQL);
    sql.push_str(indexes::SQL);
    sql
}
