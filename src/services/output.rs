use crate::domain::models::JsonOut;
use serde::Serialize;

/// Print one report: a pretty `{ok, data}` envelope in JSON mode, otherwise
/// whatever the row renderer produces (which may span multiple lines).
pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}
