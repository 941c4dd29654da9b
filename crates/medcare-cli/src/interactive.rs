//! Line-oriented interactive session.
//!
//! Each command is one interaction: it updates the current view and the view
//! is rendered again. Nothing a command does can end the session except
//! `quit` or end of input.

use std::io::{self, BufRead, Write};

use crate::context::AppContext;
use crate::display;
use crate::views::{FeatureSet, Form, MenuItem, View};

const PROMPT: &str = "medcare> ";

const HELP: &str = "\
Commands:
  1-4 | go <view>        switch view (about, pregnancy, fetal, dashboard)
  set <field> <value>   change an input (field name or label)
  predict               run the model on the current inputs
  show                  print the full feature vector sent to the model
  reset                 restore default inputs
  menu                  show the menu
  help                  show this help
  quit                  leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(MenuItem),
    Set { field: String, value: String },
    Predict,
    Show,
    Reset,
    Menu,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let cmd = match head.to_ascii_lowercase().as_str() {
            "go" | "view" => MenuItem::parse(rest)
                .map(Command::Navigate)
                .ok_or_else(|| format!("unknown view: {rest}"))?,
            "set" => {
                // The value is the last token; the field label may contain spaces.
                let (field, value) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or("usage: set <field> <value>")?;
                Command::Set {
                    field: field.trim().to_string(),
                    value: value.to_string(),
                }
            }
            "predict" => Command::Predict,
            "show" => Command::Show,
            "reset" => Command::Reset,
            "menu" => Command::Menu,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => MenuItem::parse(line)
                .map(Command::Navigate)
                .ok_or_else(|| format!("unknown command: {head} (try `help`)"))?,
        };
        Ok(Some(cmd))
    }
}

/// What to print after a command.
#[derive(Debug, PartialEq)]
enum Reply {
    /// Re-render the current view.
    View,
    Text(String),
    Quit,
}

pub struct Session<'a> {
    ctx: &'a AppContext,
    view: View,
}

impl<'a> Session<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            view: View::default(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    fn execute(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Navigate(item) => {
                self.view = View::select(item);
                Reply::View
            }
            Command::Reset => {
                self.view = View::select(self.view.item());
                Reply::View
            }
            Command::Set { field, value } => match &mut self.view {
                View::PregnancyRisk(form) => set_input(form, &field, &value),
                View::FetalHealth(form) => set_input(form, &field, &value),
                _ => no_inputs(),
            },
            Command::Predict => {
                let gateway = &self.ctx.gateway;
                match &mut self.view {
                    // Failures are stored in the form and shown by the view.
                    View::PregnancyRisk(form) => {
                        let _ = form.predict(gateway);
                    }
                    View::FetalHealth(form) => {
                        let _ = form.predict(gateway);
                    }
                    _ => return no_inputs(),
                }
                Reply::View
            }
            Command::Show => match &self.view {
                View::PregnancyRisk(form) => show_features(form),
                View::FetalHealth(form) => show_features(form),
                _ => no_inputs(),
            },
            Command::Menu => Reply::Text(display::render_sidebar(self.view.item())),
            Command::Help => Reply::Text(format!("{HELP}\n")),
            Command::Quit => Reply::Quit,
        }
    }

    fn render(&self) -> String {
        display::render_view(&self.view, self.ctx.animation.as_ref(), self.ctx.style)
    }
}

fn set_input<F: FeatureSet>(form: &mut Form<F>, field: &str, value: &str) -> Reply {
    match form.set(field, value) {
        Ok(_) => Reply::View,
        Err(e) => Reply::Text(format!("  ! {e}\n")),
    }
}

fn show_features<F: FeatureSet>(form: &Form<F>) -> Reply {
    Reply::Text(display::render_features(&form.features().to_vector()))
}

fn no_inputs() -> Reply {
    Reply::Text("  ! this view has no inputs; pick a prediction view first\n".to_string())
}

/// Run the session until `quit` or end of input.
pub fn run_session<R: BufRead, W: Write>(
    ctx: &AppContext,
    input: R,
    mut output: W,
) -> io::Result<()> {
    let mut session = Session::new(ctx);
    write!(output, "{}", display::render_sidebar(session.view().item()))?;
    writeln!(output)?;
    write!(output, "{}", session.render())?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let reply = match Command::parse(&line) {
            Ok(Some(cmd)) => session.execute(cmd),
            Ok(None) => Reply::Text(String::new()),
            Err(msg) => Reply::Text(format!("  ! {msg}\n")),
        };
        match reply {
            Reply::View => write!(output, "{}", session.render())?,
            Reply::Text(text) => write!(output, "{text}")?,
            Reply::Quit => return Ok(()),
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use medcare_ai::{Classifier, ModelGateway, ModelInfo};

    use crate::display::Style;

    struct Fixed(i64, usize);

    impl Classifier for Fixed {
        fn predict(&self, _features: &[f64]) -> anyhow::Result<i64> {
            Ok(self.0)
        }

        fn n_features(&self) -> usize {
            self.1
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                format: "fixed",
                detail: String::new(),
            }
        }
    }

    fn context(maternal: i64, fetal: i64) -> AppContext {
        let gateway =
            ModelGateway::from_classifiers(Arc::new(Fixed(maternal, 5)), Arc::new(Fixed(fetal, 21)))
                .unwrap();
        AppContext::new(gateway, None, Style { color: false })
    }

    fn run(ctx: &AppContext, script: &str) -> String {
        let mut out = Vec::new();
        run_session(ctx, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(
            Command::parse("2"),
            Ok(Some(Command::Navigate(MenuItem::PregnancyRisk)))
        );
        assert_eq!(
            Command::parse("go dashboard"),
            Ok(Some(Command::Navigate(MenuItem::Dashboard)))
        );
        assert_eq!(
            Command::parse("set Blood glucose (mmol/L) 6.5"),
            Ok(Some(Command::Set {
                field: "Blood glucose (mmol/L)".into(),
                value: "6.5".into(),
            }))
        );
        assert_eq!(Command::parse("QUIT"), Ok(Some(Command::Quit)));
        assert!(Command::parse("set Age").is_err());
        assert!(Command::parse("go nowhere").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn starts_on_about() {
        let out = run(&context(0, 0), "");
        assert!(out.contains(" > 1. About us"));
        assert!(out.contains("Welcome to MedCare"));
        assert!(out.contains("Our Features"));
    }

    #[test]
    fn maternal_prediction_flow() {
        let out = run(&context(2, 0), "2\nset Age 35\npredict\nquit\n");
        assert!(out.contains("Risk Level: High Risk"));
        assert!(out.contains("(red)"));
        assert!(out.contains("100%"));
    }

    #[test]
    fn fetal_prediction_flow() {
        let out = run(&context(0, 1), "fetal\npredict\n");
        assert!(out.contains("Fetal Health Status: Suspect"));
    }

    #[test]
    fn bad_input_is_reported_and_session_continues() {
        let out = run(&context(0, 0), "2\nset Age 150\nset Age abc\npredict\n");
        assert!(out.contains("  ! "));
        assert!(out.contains("Risk Level: Low Risk"));
    }

    #[test]
    fn model_failure_shown_in_view() {
        let out = run(&context(7, 0), "2\npredict\nmenu\n");
        assert!(out.contains("Prediction failed:"));
        assert!(out.contains(" > 2. Pregnancy Risk Prediction"));
    }

    #[test]
    fn quit_stops_reading() {
        let out = run(&context(0, 0), "quit\n4\n");
        assert!(!out.contains("Pregnancy Risk Distribution by Age Group"));
    }

    #[test]
    fn reset_restores_defaults() {
        let ctx = context(0, 0);
        let mut session = Session::new(&ctx);
        session.execute(Command::Navigate(MenuItem::PregnancyRisk));
        session.execute(Command::Set {
            field: "Age".into(),
            value: "44".into(),
        });
        session.execute(Command::Reset);
        let View::PregnancyRisk(form) = session.view() else {
            panic!("expected pregnancy view");
        };
        assert_eq!(form.features().age, 30.0);
    }

    #[test]
    fn show_needs_a_prediction_view() {
        let ctx = context(0, 0);
        let mut session = Session::new(&ctx);
        assert!(matches!(session.execute(Command::Show), Reply::Text(t) if t.contains("no inputs")));
        session.execute(Command::Navigate(MenuItem::FetalHealth));
        assert!(
            matches!(session.execute(Command::Show), Reply::Text(t) if t.contains("histogram_tendency"))
        );
    }

    #[test]
    fn dashboard_ignores_predict() {
        let ctx = context(0, 0);
        let mut session = Session::new(&ctx);
        session.execute(Command::Navigate(MenuItem::Dashboard));
        assert!(matches!(session.execute(Command::Predict), Reply::Text(_)));
        assert_eq!(session.view().item(), MenuItem::Dashboard);
    }
}
