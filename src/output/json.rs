use anyhow::Result;
use serde::Serialize;

pub fn print_json<T: Serialize>(result: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}
