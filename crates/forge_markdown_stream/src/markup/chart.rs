use forge_template::Element;
use serde_json::Value;

use super::handler::{FenceContext, FenceHandler, lang_header, parse_payload};
use crate::error::Result;

/// `echarts` fences: the JSON option object is validated and re-serialized
/// into a `data-config` attribute on the chart container.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchartsHandler;

impl FenceHandler for EchartsHandler {
    fn lang(&self) -> &str {
        "echarts"
    }

    fn render(&self, body: &str, _ctx: &FenceContext<'_>) -> Result<String> {
        let config: Value = parse_payload(self.lang(), body)?;
        Ok(Element::new("div.echarts-container")
            .attr("data-config", config.to_string())
            .append(lang_header("echarts"))
            .append(Element::new("div.echarts-chart"))
            .render())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::markup::test_context;

    #[test]
    fn test_config_is_compacted_into_attribute() {
        let fixture = "{\n  \"series\": [],\n  \"title\": {\"text\": \"Q&A\"}\n}\n";
        let actual = test_context(|ctx| EchartsHandler.render(fixture, ctx)).unwrap();
        let expected = concat!(
            r#"<div class="echarts-container" data-config="{&quot;series&quot;:[],&quot;title&quot;:{&quot;text&quot;:&quot;Q&amp;A&quot;}}">"#,
            r#"<div class="code-block-header"><span class="code-block-header__lang">echarts</span></div>"#,
            r#"<div class="echarts-chart"></div></div>"#
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let actual = test_context(|ctx| EchartsHandler.render("{bad json\n", ctx));
        assert!(matches!(actual, Err(Error::InvalidPayload { ref kind, .. }) if kind == "echarts"));
    }
}
