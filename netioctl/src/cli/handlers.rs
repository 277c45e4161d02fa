//! Command execution handlers
//!
//! Maps a parsed command onto [`NetioClient`] calls and renders the
//! result. Each handler issues at most the round trips its command
//! needs: GET and INFO one each, SET one plus a preparatory GET only
//! when `ALL` has to be expanded.

use netio_core::{Action, NetioError, Result};
use tracing::debug;

use crate::client::NetioClient;
use crate::format::{self, RowOptions};

/// Positional output selector: a literal ID or the token `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    All,
    One(u32),
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Selector::All);
        }
        s.parse::<u32>()
            .map(Selector::One)
            .map_err(|_| NetioError::Usage(format!("invalid output ID '{s}' (expected a number or ALL)")))
    }
}

/// Handle the `get` command.
pub fn handle_get(client: &NetioClient, id: &str, opts: &RowOptions) -> Result<()> {
    let mut outputs = match Selector::parse(id)? {
        Selector::All => client.get_outputs()?,
        Selector::One(id) => client.get_outputs_filtered(&[id])?,
    };
    outputs.sort_by_key(|o| o.id);

    print!("{}", format::render_outputs(&outputs, opts));
    Ok(())
}

/// Handle the `set` command.
pub fn handle_set(client: &NetioClient, pairs: &[String]) -> Result<()> {
    let changes = parse_pairs(pairs)?;
    let changes = expand_all(client, &changes)?;

    let outputs = client.set_outputs(&changes)?;
    for output in &outputs {
        println!("{}", format::format_applied(output));
    }
    Ok(())
}

/// Handle the `info` command.
pub fn handle_info(client: &NetioClient) -> Result<()> {
    let (agent, measure) = client.get_info()?;
    print!("{}", format::render_info(&agent, &measure));
    Ok(())
}

/// Parse positional `ID ACTION` pairs. Zero pairs or an odd argument
/// count is a usage error, not a no-op.
fn parse_pairs(pairs: &[String]) -> Result<Vec<(Selector, Action)>> {
    if pairs.is_empty() {
        return Err(NetioError::Usage(
            "at least one ID ACTION pair is required".to_string(),
        ));
    }
    if pairs.len() % 2 != 0 {
        return Err(NetioError::Usage(format!(
            "missing ACTION for output '{}'",
            pairs[pairs.len() - 1]
        )));
    }

    pairs
        .chunks(2)
        .map(|pair| Ok((Selector::parse(&pair[0])?, pair[1].parse::<Action>()?)))
        .collect()
}

/// Expand `ALL` selectors to every output the device reports, via one
/// read request. A repeated ID keeps its first position but takes the
/// last action given for it, matching the device's in-order semantics.
fn expand_all(client: &NetioClient, changes: &[(Selector, Action)]) -> Result<Vec<(u32, Action)>> {
    let device_ids: Vec<u32> = if changes.iter().any(|(s, _)| *s == Selector::All) {
        let outputs = client.get_outputs()?;
        debug!(outputs = outputs.len(), "expanding ALL selector");
        outputs.iter().map(|o| o.id).collect()
    } else {
        Vec::new()
    };

    let mut expanded: Vec<(u32, Action)> = Vec::new();
    let mut push = |id: u32, action: Action| {
        match expanded.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = action,
            None => expanded.push((id, action)),
        }
    };

    for (selector, action) in changes {
        match selector {
            Selector::One(id) => push(*id, *action),
            Selector::All => {
                for id in &device_ids {
                    push(*id, *action);
                }
            }
        }
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("all").unwrap(), Selector::All);
        assert_eq!(Selector::parse("ALL").unwrap(), Selector::All);
        assert_eq!(Selector::parse("3").unwrap(), Selector::One(3));
        assert!(matches!(Selector::parse("x"), Err(NetioError::Usage(_))));
        assert!(matches!(Selector::parse("-1"), Err(NetioError::Usage(_))));
    }

    #[test]
    fn test_parse_pairs() {
        let parsed = parse_pairs(&pairs(&["1", "ON", "2", "off"])).unwrap();
        assert_eq!(
            parsed,
            vec![
                (Selector::One(1), Action::On),
                (Selector::One(2), Action::Off)
            ]
        );
    }

    #[test]
    fn test_parse_pairs_odd_count_is_usage_error() {
        assert!(matches!(
            parse_pairs(&pairs(&["1", "ON", "2"])),
            Err(NetioError::Usage(_))
        ));
    }

    #[test]
    fn test_parse_pairs_empty_is_usage_error() {
        assert!(matches!(parse_pairs(&[]), Err(NetioError::Usage(_))));
    }

    #[test]
    fn test_parse_pairs_bad_action() {
        assert!(matches!(
            parse_pairs(&pairs(&["1", "BLINK"])),
            Err(NetioError::Usage(_))
        ));
    }
}
