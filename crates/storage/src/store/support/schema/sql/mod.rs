#![forbid(unsafe_code)]

mod core;
mod indexes;
mod pragmas;
mod projects;
mod taxonomy;
mod tickets;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(pragmas::SQL);
    sql.push_str(core::SQL);
    sql.push_str(projects::SQL);
    sql.push_str(taxonomy::SQL);
    sql.push_str(tickets::SQL);
    sql.push_str(indexes::SQL);
    sql
}
