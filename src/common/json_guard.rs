/// Size and nesting bounds applied to an inbound payload before it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLimits {
    pub max_bytes: usize,
    pub max_depth: usize,
}

impl Default for JsonLimits {
    fn default() -> Self {
        Self {
            max_bytes: 256 * 1024,
            max_depth: 16,
        }
    }
}

pub fn check_json_limits(input: &[u8], limits: JsonLimits) -> Result<(), &'static str> {
    if input.len() > limits.max_bytes {
        return Err("payload too large");
    }
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Err("payload empty");
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for &byte in input {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match byte {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limits.max_depth {
                    return Err("payload nested too deeply");
                }
            }
            b'}' | b']' => {
                if depth == 0 {
                    return Err("payload structure invalid");
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    Ok(())
}
