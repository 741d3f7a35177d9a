//! Keystroke scripts for `mentions replay`.
//!
//! Plain characters are typed. Braced escapes stand for keys and pointer
//! events: `{left}` `{right}` `{home}` `{end}` `{bs}` `{up}` `{down}`
//! `{enter}` `{tab}` `{esc}` `{click}` `{blur}`. `{{` types a literal brace.

use miette::{Result, miette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Type(char),
    Left,
    Right,
    Home,
    End,
    Backspace,
    Up,
    Down,
    Enter,
    Tab,
    Escape,
    Click,
    Blur,
}

pub fn parse(script: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut chars = script.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            steps.push(Step::Type(c));
            continue;
        }

        let mut name = String::new();
        loop {
            match chars.next() {
                Some('{') if name.is_empty() => {
                    steps.push(Step::Type('{'));
                    break;
                }
                Some('}') => {
                    steps.push(escape(&name)?);
                    break;
                }
                Some(c) => name.push(c),
                None => return Err(miette!("unterminated escape `{{{name}`")),
            }
        }
    }
    Ok(steps)
}

fn escape(name: &str) -> Result<Step> {
    let step = match name {
        "left" => Step::Left,
        "right" => Step::Right,
        "home" => Step::Home,
        "end" => Step::End,
        "bs" => Step::Backspace,
        "up" => Step::Up,
        "down" => Step::Down,
        "enter" => Step::Enter,
        "tab" => Step::Tab,
        "esc" => Step::Escape,
        "click" => Step::Click,
        "blur" => Step::Blur,
        other => return Err(miette!("unknown escape `{{{other}}}`")),
    };
    Ok(step)
}
