use crate::errors::AppError;
use std::io::{self, BufRead, Write};

pub fn prompt(message: &str) -> Result<(), AppError> {
    print!("{}", message);
    io::stdout().flush()?;
    Ok(())
}

pub fn get_input() -> Result<String, AppError> {
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn get_input_to_lower() -> Result<String, AppError> {
    Ok(get_input()?.to_lowercase())
}

/// Ask a y/n question; anything but `y`/`yes` is a no.
pub fn confirm_action(action: &str) -> Result<bool, AppError> {
    println!("\nAre you sure you want to {}? (y/n)", action);
    prompt("> ")?;

    let answer = get_input_to_lower()?;
    Ok(matches!(answer.as_str(), "y" | "yes"))
}
