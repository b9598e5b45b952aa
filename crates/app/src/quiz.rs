//! Terminal front end: interactive sessions, stats and history listings.

use std::io::{BufRead, Write};

use services::{QuizSession, SessionHistoryService, SessionLoopService, StatsService};
use trivia_core::Catalog;
use trivia_core::model::{ChoiceId, PlayerId, Question, QuestionId, SessionMode};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

enum Input {
    Choice(ChoiceId),
    Quit,
}

/// Run one session, reading a letter per question from `input`.
///
/// Stops early on `q` or end of input; answers given so far stay persisted
/// and the question on screen counts as seen today.
pub async fn play(
    session_loop: &SessionLoopService,
    player: &PlayerId,
    mode: SessionMode,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> CliResult<()> {
    let mut session = session_loop.start_session(player, mode).await?;
    writeln!(
        out,
        "{} session for {player}: {} questions, rating {}",
        mode_label(mode),
        session.total_questions(),
        session.rating()
    )?;

    while let Some(question) = session.current_question() {
        let position = session.progress().position();
        print_question(out, position, session.total_questions(), question)?;
        let choice = match read_choice(input, out, question)? {
            Input::Choice(choice) => choice,
            Input::Quit => {
                session_loop.abandon_session(&session).await?;
                writeln!(out, "Session abandoned.")?;
                return Ok(());
            }
        };

        let result = session_loop.answer_current(&mut session, &choice).await?;
        let answer = &result.answer;
        if answer.log.correct {
            writeln!(out, "Correct! ({:+})", answer.rating.delta)?;
        } else {
            let text =
                question_choice_text(&session, &answer.log.question_id, &answer.correct_choice);
            writeln!(
                out,
                "Wrong, the answer was {text}. ({:+})",
                answer.rating.delta
            )?;
        }
        if let Some(explanation) = explanation_for(session.questions(), &answer.log.question_id) {
            writeln!(out, "  {explanation}")?;
        }
    }

    let correct = session.results().iter().filter(|r| r.log.correct).count();
    writeln!(out)?;
    writeln!(
        out,
        "Session complete: {correct}/{} correct, rating {} ({:+})",
        session.total_questions(),
        session.rating(),
        session.rating() - session.rating_before()
    )?;
    Ok(())
}

/// Print per-question answer statistics.
pub async fn print_stats(
    stats: &StatsService,
    catalog: &Catalog,
    out: &mut impl Write,
) -> CliResult<()> {
    let report = stats.question_report(catalog).await?;
    writeln!(
        out,
        "{:>4}  {:<10} {:<10} {:>6} {:>8} {:>8}",
        "#", "id", "category", "shown", "correct", "percent"
    )?;
    for row in report {
        let percent = row
            .percent_correct
            .map_or_else(|| "-".to_string(), |p| format!("{p:.0}%"));
        writeln!(
            out,
            "{:>4}  {:<10} {:<10} {:>6} {:>8} {:>8}",
            row.number,
            row.question_id.as_str(),
            row.category.as_str(),
            row.shown,
            row.correct,
            percent
        )?;
    }
    Ok(())
}

/// Print the player's most recent sessions.
pub async fn print_history(
    history: &SessionHistoryService,
    player: &PlayerId,
    limit: u32,
    out: &mut impl Write,
) -> CliResult<()> {
    let items = history.list_recent(player, limit).await?;
    if items.is_empty() {
        writeln!(out, "No sessions yet for {player}.")?;
        return Ok(());
    }
    for item in items {
        writeln!(
            out,
            "{}  {:<9} {}/{}  rating {} ({:+})",
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.mode.as_str(),
            item.correct,
            item.total,
            item.rating_after,
            item.rating_change
        )?;
    }
    Ok(())
}

fn mode_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Standard => "Standard",
        SessionMode::DataOnly => "Data-only",
        SessionMode::Daily => "Daily challenge",
    }
}

fn print_question(
    out: &mut impl Write,
    position: usize,
    total: usize,
    question: &Question,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "[{position}/{total}] {} (difficulty {})",
        question.prompt(),
        question.difficulty().value()
    )?;
    for (letter, choice) in LETTERS.iter().zip(question.choices()) {
        writeln!(out, "  {letter}) {}", choice.text)?;
    }
    Ok(())
}

fn read_choice(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &Question,
) -> std::io::Result<Input> {
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Input::Quit);
        }
        let answer = line.trim().to_ascii_lowercase();
        if answer == "q" {
            return Ok(Input::Quit);
        }
        if let Some(choice) = choice_for_letter(question, &answer) {
            return Ok(Input::Choice(choice));
        }
        let last = LETTERS[question.choices().len().min(LETTERS.len()) - 1];
        writeln!(out, "Type a letter from a to {last}, or q to quit.")?;
    }
}

fn choice_for_letter(question: &Question, answer: &str) -> Option<ChoiceId> {
    let mut chars = answer.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let index = LETTERS.iter().position(|l| *l == letter)?;
    question.choices().get(index).map(|c| c.id.clone())
}

fn question_choice_text(
    session: &QuizSession,
    question_id: &QuestionId,
    choice: &ChoiceId,
) -> String {
    session
        .questions()
        .iter()
        .find(|q| q.id() == question_id)
        .and_then(|q| {
            q.choices()
                .iter()
                .zip(LETTERS)
                .find(|(c, _)| &c.id == choice)
                .map(|(c, letter)| format!("{letter}) {}", c.text))
        })
        .unwrap_or_else(|| choice.to_string())
}

fn explanation_for<'a>(
    questions: &'a [Question],
    question_id: &QuestionId,
) -> Option<&'a str> {
    questions
        .iter()
        .find(|q| q.id() == question_id)
        .and_then(Question::explanation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::AppServices;
    use std::io::Cursor;
    use trivia_core::time::fixed_clock;

    fn services() -> AppServices {
        AppServices::in_memory(fixed_clock(), Catalog::sample().unwrap())
    }

    #[test]
    fn letters_map_to_choice_ids() {
        let catalog = Catalog::sample().unwrap();
        let question = &catalog.questions()[0];
        assert_eq!(
            choice_for_letter(question, "a"),
            Some(question.choices()[0].id.clone())
        );
        assert_eq!(choice_for_letter(question, "ab"), None);
        assert_eq!(choice_for_letter(question, "z"), None);
        assert_eq!(choice_for_letter(question, ""), None);
    }

    #[tokio::test]
    async fn play_runs_a_full_session() {
        let services = services();
        let player = PlayerId::new("local");
        // Invalid input is re-prompted before the first answer.
        let mut input = Cursor::new("x\na\nb\nc\na\nb\n");
        let mut out = Vec::new();

        play(
            &services.session_loop(),
            &player,
            SessionMode::Daily,
            &mut input,
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Type a letter"));
        assert!(text.contains("Session complete"));

        let mut listing = Vec::new();
        print_history(&services.history(), &player, 10, &mut listing)
            .await
            .unwrap();
        assert!(String::from_utf8(listing).unwrap().contains("daily"));
    }

    #[tokio::test]
    async fn quitting_leaves_no_summary() {
        let services = services();
        let player = PlayerId::new("local");
        let mut input = Cursor::new("a\nq\n");
        let mut out = Vec::new();

        play(
            &services.session_loop(),
            &player,
            SessionMode::Standard,
            &mut input,
            &mut out,
        )
        .await
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("abandoned"));

        let mut listing = Vec::new();
        print_history(&services.history(), &player, 10, &mut listing)
            .await
            .unwrap();
        assert!(String::from_utf8(listing).unwrap().contains("No sessions yet"));
    }

    #[tokio::test]
    async fn stats_lists_every_question() {
        let services = services();
        let mut out = Vec::new();
        print_stats(&services.stats(), &services.catalog(), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), services.catalog().len() + 1);
    }
}
