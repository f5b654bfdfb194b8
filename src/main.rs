use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use ytquiz::question::QuestionKind;
use ytquiz::time::format_time_code;
use ytquiz::QuizDocument;

#[derive(Parser)]
#[command(name = "ytquiz", version, about = "Inspect quiz documents for video widgets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a quiz document and print each video's question schedule
    Check { file: PathBuf },
    /// Print the form HTML for one question
    Render {
        file: PathBuf,
        #[arg(long)]
        video: String,
        #[arg(long, default_value_t = 0)]
        question: usize,
    },
}

fn load(path: &Path) -> anyhow::Result<QuizDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    QuizDocument::from_json(&json).with_context(|| format!("loading {}", path.display()))
}

fn check(path: &Path) -> anyhow::Result<()> {
    let doc = load(path)?;
    let mut malformed = 0;
    for video in &doc.videos {
        println!("{}", video.id);
        for (i, q) in video.questions()?.iter().enumerate() {
            let when = match q.time().try_resolve() {
                Ok(secs) => format_time_code(secs),
                Err(e) => {
                    log::warn!("{} question {}: {}; it will never be shown", video.id, i, e);
                    malformed += 1;
                    "--:--".to_string()
                }
            };
            let kind = match &q.kind {
                QuestionKind::MultipleChoice { choices, .. } => format!("choice({})", choices.len()),
                QuestionKind::FillInBlank { .. } => "blank".to_string(),
            };
            println!("  {:>6}  {:<10} {}", when, kind, q.prompt);
        }
    }
    if malformed > 0 {
        bail!("{} question(s) have malformed times", malformed);
    }
    Ok(())
}

#[cfg(feature = "headless")]
fn render(path: &Path, video_id: &str, index: usize) -> anyhow::Result<()> {
    use ytquiz::presenter::QuestionForm;
    use ytquiz::render::{ElementIds, HeadlessPage, RenderTarget};

    let doc = load(path)?;
    let video = doc
        .video(video_id)
        .with_context(|| format!("no video {:?} in {}", video_id, path.display()))?;
    let questions = video.questions()?;
    let question = questions
        .get(index)
        .with_context(|| format!("video {:?} has {} question(s)", video_id, questions.len()))?;

    let ids = ElementIds::for_video(video_id);
    let page = HeadlessPage::new();
    page.ensure_container(&ids.question);
    QuestionForm::render(&page, &ids, index, question)?;
    println!("{}", page.inner_html(&ids.question).unwrap_or_default());
    Ok(())
}

#[cfg(not(feature = "headless"))]
fn render(_path: &Path, _video_id: &str, _index: usize) -> anyhow::Result<()> {
    bail!("rendering requires the 'headless' feature")
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Check { file } => check(&file),
        Command::Render { file, video, question } => render(&file, &video, question),
    }
}
