//! Prompts for generating small QuickJS-compatible scripts.

use rand::seq::SliceRandom;
use rand::Rng;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a code generator. Generate only JavaScript code, \
no explanations or markdown. The code will run in QuickJS.";

const DEFAULT_TASKS: &[&str] = &[
    "Generate a JavaScript script that calculates the first 10 Fibonacci numbers and prints them. Use console.log.",
    "Generate a JavaScript script that calculates factorial of numbers from 1 to 10 and prints each result. Use console.log.",
    "Generate a JavaScript script that finds all prime numbers up to 50 and prints them. Use console.log.",
    "Generate a JavaScript script that reverses a string \"Hello World\" and counts vowels in it. Use console.log.",
    "Generate a JavaScript script that generates the multiplication table for numbers 1-5. Use console.log.",
    "Generate a JavaScript script that calculates the sum of squares of numbers from 1 to 10. Use console.log.",
    "Generate a JavaScript script that checks if numbers from 1 to 20 are even or odd and prints the results. Use console.log.",
    "Generate a JavaScript script that finds the greatest common divisor (GCD) of 48 and 18. Use console.log.",
    "Generate a JavaScript script that generates a simple pattern of asterisks (pyramid shape). Use console.log.",
    "Generate a JavaScript script that converts temperatures from Celsius to Fahrenheit for values 0, 10, 20, 30, 40. Use console.log.",
];

/// Task prompts plus the system prompt they are sent with.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    system_prompt: String,
    tasks: Vec<String>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tasks: DEFAULT_TASKS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PromptCatalog {
    /// Catalog with custom tasks; an empty list falls back to the built-ins.
    pub fn with_tasks(tasks: Vec<String>) -> Self {
        if tasks.is_empty() {
            return Self::default();
        }
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Pick one task uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.tasks
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_TASKS[0])
    }

    /// Wrap a task with the constraints every generated script must follow.
    pub fn user_message(&self, task: &str) -> String {
        format!(
            "{task}\n\nRequirements:\n\
             - Do not use any Node.js-specific APIs\n\
             - Return a final result\n\
             - Only return the code, no markdown, no explanations."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_catalog() {
        let catalog = PromptCatalog::default();
        assert_eq!(catalog.tasks().len(), 10);
        assert!(catalog.system_prompt().contains("QuickJS"));
        assert!(catalog.tasks().iter().all(|t| t.contains("console.log")));
    }

    #[test]
    fn test_pick_returns_catalog_entry() {
        let catalog = PromptCatalog::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let task = catalog.pick(&mut rng);
            assert!(catalog.tasks().iter().any(|t| t == task));
        }
    }

    #[test]
    fn test_with_tasks_empty_falls_back() {
        assert_eq!(PromptCatalog::with_tasks(Vec::new()).tasks().len(), 10);
        let custom = PromptCatalog::with_tasks(vec!["print 1".to_string()]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(custom.pick(&mut rng), "print 1");
    }

    #[test]
    fn test_user_message_requirements() {
        let msg = PromptCatalog::default().user_message("Do a thing.");
        assert!(msg.starts_with("Do a thing.\n\nRequirements:"));
        assert!(msg.contains("Node.js-specific APIs"));
        assert!(msg.ends_with("no markdown, no explanations."));
    }
}
