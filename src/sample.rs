use crate::error::CycleError;

/// Number of comma-separated fields in a statistics payload.
pub const FIELD_COUNT: usize = 7;

/// One parsed statistics payload, in wire order:
///
/// `load,mem_total,mem_used,disk_total,disk_used,net_total,net_used`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub load_average: f64,
    /// Bytes
    pub mem_total: f64,
    pub mem_used: f64,
    /// Bytes
    pub disk_total: f64,
    pub disk_used: f64,
    /// Bits per second
    pub net_total: f64,
    pub net_used: f64,
}

impl Sample {
    /// Parse a raw response body.
    ///
    /// Surrounding whitespace on the body and on each token is ignored.
    /// Parsing stops at the first token that is not a number. `NaN` and
    /// `inf` literals are numbers; a finite literal too large for `f64`
    /// is not. Negative values and `used > total` pass through untouched,
    /// but a zero total is rejected since no usage ratio exists for it.
    pub fn parse(raw: &str) -> Result<Self, CycleError> {
        let tokens: Vec<&str> = raw.trim().split(',').collect();
        if tokens.len() != FIELD_COUNT {
            return Err(CycleError::FieldCount(tokens.len()));
        }

        let mut values = [0.0f64; FIELD_COUNT];
        for (index, (slot, token)) in values.iter_mut().zip(&tokens).enumerate() {
            let token = token.trim();
            *slot = match token.parse::<f64>() {
                Ok(v) if v.is_finite() || is_infinity_literal(token) => v,
                _ => {
                    return Err(CycleError::InvalidNumber {
                        index,
                        token: token.to_owned(),
                    })
                }
            };
        }

        let [load_average, mem_total, mem_used, disk_total, disk_used, net_total, net_used] =
            values;

        for (name, total) in [("memory", mem_total), ("disk", disk_total), ("network", net_total)] {
            if total == 0.0 {
                return Err(CycleError::ZeroTotal(name));
            }
        }

        Ok(Self {
            load_average,
            mem_total,
            mem_used,
            disk_total,
            disk_used,
            net_total,
            net_used,
        })
    }

    pub fn memory_ratio(&self) -> f64 {
        self.mem_used / self.mem_total
    }

    pub fn disk_ratio(&self) -> f64 {
        self.disk_used / self.disk_total
    }

    pub fn network_ratio(&self) -> f64 {
        self.net_used / self.net_total
    }
}

/// `inf`, `-Infinity`, ... as opposed to `1e400` overflowing to infinity.
fn is_infinity_literal(token: &str) -> bool {
    let unsigned = token.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}
