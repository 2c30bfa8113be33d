/// Parses `90`, `90s`, `20m`, `1h30m` or `2h` into seconds.
pub fn parse_duration_secs(text: &str) -> Result<i64, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty duration".to_owned());
    }

    if let Ok(secs) = text.parse::<i64>() {
        return Ok(secs);
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let unit = match ch {
            'h' | 'H' => 3600,
            'm' | 'M' => 60,
            's' | 'S' => 1,
            _ => return Err(format!("unexpected '{ch}' in duration '{text}'")),
        };
        let value: i64 = digits
            .parse()
            .map_err(|_| format!("missing number before '{ch}' in '{text}'"))?;
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| format!("duration '{text}' is too large"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after '{digits}' in '{text}'"));
    }

    Ok(total)
}
