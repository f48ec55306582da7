//! The `quizgate init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizgate.toml
    if std::path::Path::new("quizgate.toml").exists() {
        println!("quizgate.toml already exists, skipping.");
    } else {
        std::fs::write("quizgate.toml", SAMPLE_CONFIG)?;
        println!("Created quizgate.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizgate validate --quizzes quizzes");
    println!("  2. Run: quizgate register --user you --name \"Your Name\" --email you@example.com");
    println!("  3. Run: quizgate check --quiz qz-example --user you");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgate configuration

quiz_dir = "./quizzes"
store_path = "./quizgate-store.json"

[policy]
max_failed_attempts = 2
cooldown_days = 7
verification_window_days = 25
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "qz-example"
title = "Example Knowledge Quiz"
description = "A starter quiz to copy from."
movie_id = "mv-example"
movie_title = "The Example Picture"
movie_release_date = "2024-01-01"
pass_score = 70
status = "active"

[[questions]]
id = "q1"
text = "What color dominates the example poster?"
kind = "single-choice"
explanation = "The poster is famously blue."

[[questions.options]]
id = "q1-a"
text = "Blue"
correct = true

[[questions.options]]
id = "q1-b"
text = "Red"

[[questions]]
id = "q2"
text = "The example movie won an award at its festival premiere."
kind = "true-false"
explanation = "It took the audience award."

[[questions.options]]
id = "q2-t"
text = "True"
correct = true

[[questions.options]]
id = "q2-f"
text = "False"

[[questions]]
id = "q3"
text = "Which of these characters appear in the example movie?"
kind = "multi-select"
explanation = "Both leads appear; the cameo was cut."

[[questions.options]]
id = "q3-a"
text = "The first lead"
correct = true

[[questions.options]]
id = "q3-b"
text = "The second lead"
correct = true

[[questions.options]]
id = "q3-c"
text = "The rumored cameo"
"#;
