//! Evaluation orchestrator
//!
//! Drives the full pipeline for each prompt: weight the prompt, collect
//! one generation attempt per model variant, then score every successful
//! candidate with the compilation, security, quality, and functionality
//! evaluators. Failed variants are recorded as skipped and excluded from
//! scoring. Each (prompt, model) unit is independent; execution is
//! sequential.

use crate::config::EvalConfig;
use crate::evaluators::{
    prompt_weight, FunctionalityAnalyzer, ModuleCompiler, QualityAnalyzer, VulnScanner,
};
use crate::llm::CodeGenerator;
use crate::models::{
    CodeScores, EvalRun, ModelEvaluation, PromptEvaluation, SkippedGeneration,
};
use tracing::{info, warn};

pub struct Harness {
    generator: Box<dyn CodeGenerator>,
    scanner: VulnScanner,
    compiler: ModuleCompiler,
    quality: QualityAnalyzer,
    functionality: FunctionalityAnalyzer,
}

impl Harness {
    pub fn new(generator: Box<dyn CodeGenerator>, config: &EvalConfig) -> Self {
        Self {
            generator,
            scanner: VulnScanner::new(),
            compiler: ModuleCompiler::new(&config.tools),
            quality: QualityAnalyzer::new(&config.tools),
            functionality: FunctionalityAnalyzer::new(),
        }
    }

    /// Score one candidate source with every evaluator.
    ///
    /// Evaluators degrade internally (unavailable tools, timeouts); this
    /// never fails for a scoring reason.
    pub fn evaluate_code(&self, code: &str) -> CodeScores {
        info!("Evaluating candidate: compilation");
        let compilation = self.compiler.evaluate(code);

        info!("Evaluating candidate: security");
        let security = self.scanner.evaluate(code);

        info!("Evaluating candidate: quality");
        let quality = self.quality.evaluate(code);

        info!("Evaluating candidate: functionality");
        let functionality = self.functionality.evaluate(code);

        CodeScores {
            compilation,
            security,
            quality,
            functionality,
        }
    }

    /// Generate and score all model variants for one prompt.
    pub fn evaluate_prompt(&self, prompt: &str) -> PromptEvaluation {
        let weight = prompt_weight(prompt);
        let attempts = self.generator.generate(prompt);

        let mut evaluated = Vec::new();
        let mut skipped = Vec::new();

        for attempt in attempts {
            if !attempt.success {
                warn!(
                    "Model {} failed to generate code: {}",
                    attempt.model, attempt.output
                );
                skipped.push(SkippedGeneration {
                    model: attempt.model,
                    reason: attempt.output,
                });
                continue;
            }

            let scores = self.evaluate_code(&attempt.output);
            evaluated.push(ModelEvaluation {
                model: attempt.model,
                code: attempt.output,
                scores,
            });
        }

        PromptEvaluation {
            prompt: prompt.to_string(),
            prompt_weight: weight,
            evaluated,
            skipped,
        }
    }

    /// Evaluate a batch of prompts into one run report.
    pub fn evaluate_all(&self, prompts: &[String]) -> EvalRun {
        let mut results = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            info!("Evaluating prompt: {}", prompt);
            results.push(self.evaluate_prompt(prompt));
        }
        EvalRun::new(results)
    }
}
