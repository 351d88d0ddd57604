use std::io::{self, Read};

use trade_bias_core::{BiasAnalysisInput, RawTrade};

/// Trade rows piped on stdin. None when stdin is a terminal or blank.
pub fn read_stdin_trades() -> Result<Option<Vec<RawTrade>>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(text: &str) -> Result<Option<Vec<RawTrade>>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let input = BiasAnalysisInput::from_json_str(trimmed)
        .map_err(|e| format!("Failed to parse trade log from stdin: {}", e))?;
    Ok(Some(input.trades))
}
