//! Synthesize command - show the pattern for a context and example value.

use clap::Args;
use console::style;

use confluxys_core::template::ValueShape;
use confluxys_core::{synthesize_pattern, MatchingEngine};

use super::GlobalOptions;

/// Arguments for the synthesize command.
#[derive(Args)]
pub struct SynthesizeArgs {
    /// Excerpt containing the example value
    #[arg(long)]
    context: String,

    /// The example value, exactly as it appears in the context
    #[arg(long)]
    value: String,

    /// Text to try the pattern against
    #[arg(long)]
    test: Option<String>,
}

pub async fn run(args: SynthesizeArgs, options: &GlobalOptions) -> anyhow::Result<()> {
    if !args.context.contains(&args.value) {
        eprintln!(
            "{} The value does not occur in the context; using the literal fallback.",
            style("⚠").yellow()
        );
    }

    let pattern = synthesize_pattern(&args.context, &args.value);
    println!("{}", pattern);

    if let Some(text) = &args.test {
        let config = options.load_config()?;
        let engine = MatchingEngine::new(config.extraction);
        let captured = try_pattern(&engine, &pattern, text)?;

        eprintln!("{} Value shape: {:?}", style("ℹ").blue(), ValueShape::classify(&args.value));
        match captured {
            Some(value) => println!("{} Captured: {}", style("✓").green(), value),
            None => println!("{} No match", style("✗").red()),
        }
    }

    Ok(())
}

/// Run `pattern` over `text` under the engine's compile limits.
fn try_pattern(engine: &MatchingEngine, pattern: &str, text: &str) -> anyhow::Result<Option<String>> {
    let regex = engine.compile_pattern("pattern", pattern)?;
    Ok(regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluxys_core::models::config::ExtractionConfig;

    #[test]
    fn test_try_pattern_captures() {
        let engine = MatchingEngine::default();
        let captured = try_pattern(&engine, r"Total: (\d+) USD", "Total: 99 USD").unwrap();
        assert_eq!(captured.as_deref(), Some("99"));
    }

    #[test]
    fn test_try_pattern_honours_size_limit() {
        let engine = MatchingEngine::new(ExtractionConfig {
            regex_size_limit: 16,
            ..ExtractionConfig::default()
        });
        assert!(try_pattern(&engine, r"Total: (\w{50}) USD", "Total: 99 USD").is_err());
    }
}
