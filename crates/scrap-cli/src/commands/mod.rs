pub mod asset;
pub mod dispatch;
pub mod health;
pub mod link;
pub mod object;
pub mod project;

/// Parse an inline JSON argument, naming the flag on failure.
pub(crate) fn parse_json_arg(flag: &str, raw: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--{flag} is not valid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::parse_json_arg;

    #[test]
    fn json_args_parse_or_name_the_flag() {
        assert_eq!(parse_json_arg("position", r#"{"x":1}"#).unwrap()["x"], 1);
        let err = parse_json_arg("position", "{x:1}").unwrap_err();
        assert!(err.to_string().starts_with("--position is not valid JSON"));
    }
}
