use anyhow::{anyhow, Result};

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_table_name(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("sales_table is empty"));
    }
    for part in trimmed.split('.') {
        let mut chars = part.chars();
        let valid_start = chars
            .next()
            .map(|ch| ch.is_ascii_alphabetic() || ch == '_')
            .unwrap_or(false);
        if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(anyhow!("sales_table '{}' is not a plain identifier", value));
        }
    }
    Ok(())
}

pub fn validate_mail_address(value: &str) -> Result<()> {
    let trimmed = value.trim();
    let Some((local, domain)) = trimmed.rsplit_once('@') else {
        return Err(anyhow!("'{}' is not an email address", value));
    };
    if local.is_empty() || domain.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(anyhow!("'{}' is not an email address", value));
    }
    Ok(())
}
