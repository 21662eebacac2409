use super::{check_finding, Check, CheckContext};
use crate::models::{Finding, FindingCategory, Severity};

/// Too many hedging phrases ("you can", "you might", ...) in the body.
pub struct WeakPhraseCheck;

impl Check for WeakPhraseCheck {
    fn name(&self) -> &'static str {
        "weak-phrases"
    }

    fn description(&self) -> &'static str {
        "Detects bodies that hedge instead of giving instructions"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Style
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let style = &ctx.config.style;
        let body = ctx.package.body.to_lowercase();
        let count: usize = style
            .weak_phrases
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .map(|p| body.matches(p.as_str()).count())
            .sum();
        if count <= style.weak_phrase_limit {
            return vec![];
        }
        vec![check_finding(
            self,
            Severity::Low,
            format!(
                "Body uses {} weak phrases (limit {})",
                count, style.weak_phrase_limit
            ),
        )
        .at(&ctx.package.manifest_path, None)
        .with_suggestion("Replace 'you can'/'you should' with direct imperatives")]
    }
}
