use mkreadme::{Config, GenerateError, ReadmeGenerator, generate_with, prepare_prompt};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;
use tokio::fs;

/// Returns a fixed reply and remembers the prompt it was given.
struct CannedGenerator {
    reply: Option<String>,
    seen: Mutex<Option<String>>,
}

impl CannedGenerator {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(None),
        }
    }

    fn prompt(&self) -> String {
        self.seen.lock().unwrap().clone().unwrap_or_default()
    }
}

impl ReadmeGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        *self.seen.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(GenerateError::EmptyResponse)
    }
}

/// Creates `proj/` with `a.txt`, `main.rs` and `sub/b.txt`.
fn sample_project(root: &std::path::Path) -> anyhow::Result<PathBuf> {
    let proj = root.join("proj");
    std::fs::create_dir_all(proj.join("sub"))?;
    std::fs::write(proj.join("a.txt"), "alpha")?;
    std::fs::write(proj.join("sub/b.txt"), "beta")?;

    let mut file = File::create(proj.join("main.rs"))?;
    writeln!(file, "fn main() {{ println!(\"Hello, world!\"); }}")?;
    Ok(proj)
}

#[tokio::test]
async fn it_generates_readme_output() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;
    let output_path = temp_dir.path().join("README.md");

    let config = Config::new(proj.join("main.rs"), output_path.clone());
    let generator = CannedGenerator::replying("# proj\n\nA greeting program.");

    generate_with(&config, &generator).await?;

    let contents = fs::read_to_string(&output_path).await?;
    assert_eq!(contents, "# proj\n\nA greeting program.\n");

    let prompt = generator.prompt();
    assert!(prompt.contains("```rust\nfn main()"));
    assert!(prompt.contains("proj\n├── a.txt\n├── main.rs\n└── sub\n    └── b.txt\n"));

    Ok(())
}

#[tokio::test]
async fn it_references_existing_readme() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;
    let output_path = temp_dir.path().join("README.md");
    std::fs::write(&output_path, "# Old README\n")?;

    let config = Config::new(proj.join("main.rs"), output_path.clone());
    let prepared = prepare_prompt(&config).await?;
    assert!(prepared.prompt.contains("# Old README"));
    assert!(prepared.prompt.starts_with("Create a new README"));

    let mut config = Config::new(proj.join("main.rs"), output_path);
    config.reset = true;
    let prepared = prepare_prompt(&config).await?;
    assert!(!prepared.prompt.contains("# Old README"));

    Ok(())
}

#[tokio::test]
async fn it_documents_a_folder() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;

    let config = Config::new(proj.clone(), temp_dir.path().join("README.md"));
    let prepared = prepare_prompt(&config).await?;

    assert!(!prepared.prompt.contains("Source code"));
    assert_eq!(prepared.tree.lines().count(), 5);
    assert!(prepared.tree.starts_with("proj\n"));

    Ok(())
}

#[tokio::test]
async fn it_keeps_existing_readme_when_generation_fails() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;
    let output_path = temp_dir.path().join("README.md");
    std::fs::write(&output_path, "# Keep me\n")?;

    let config = Config::new(proj.join("main.rs"), output_path.clone());
    let err = generate_with(&config, &CannedGenerator::failing())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("README generation failed"));

    let contents = fs::read_to_string(&output_path).await?;
    assert_eq!(contents, "# Keep me\n");

    Ok(())
}

#[tokio::test]
async fn it_rejects_missing_target() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let config = Config::new(
        temp_dir.path().join("missing.rs"),
        temp_dir.path().join("README.md"),
    );
    let err = prepare_prompt(&config).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    Ok(())
}

#[tokio::test]
async fn it_rejects_binary_target() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let binary_file_path = temp_dir.path().join("binary_file.bin");

    let mut file = File::create(&binary_file_path)?;
    file.write_all(&[0x00, 0xFF, 0xAA, 0x55])?;

    let config = Config::new(binary_file_path, temp_dir.path().join("README.md"));
    assert!(prepare_prompt(&config).await.is_err());
    Ok(())
}

#[tokio::test]
async fn it_excludes_hidden_and_gitignored_entries() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;
    std::fs::write(proj.join(".gitignore"), "target/\n")?;
    std::fs::create_dir(proj.join("target"))?;
    std::fs::write(proj.join("target/app"), "bin")?;
    std::fs::write(proj.join(".env"), "SECRET=1")?;

    let config = Config::new(proj.join("main.rs"), temp_dir.path().join("README.md"));
    let prepared = prepare_prompt(&config).await?;
    assert!(!prepared.tree.contains("target"));
    assert!(!prepared.tree.contains(".env"));

    let mut config = Config::new(proj.join("main.rs"), temp_dir.path().join("README.md"));
    config.tree.show_hidden = true;
    config.tree.respect_gitignore = false;
    let prepared = prepare_prompt(&config).await?;
    assert!(prepared.tree.contains("target"));
    assert!(prepared.tree.contains(".env"));

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn it_reports_unreachable_readme_location() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let proj = sample_project(temp_dir.path())?;
    let blocker = temp_dir.path().join("not_a_dir");
    std::fs::write(&blocker, "plain file")?;

    let config = Config::new(proj.join("main.rs"), blocker.join("README.md"));
    let err = prepare_prompt(&config).await.unwrap_err();
    assert!(err.to_string().contains("Failed to check for existing README"));

    Ok(())
}
