//! Interactive history viewer over a terminal.

use crate::cli::presentation::{format_version_view, render_patch};
use crate::history::{navigate, NavEvent, NavOutcome, Version};
use console::{Key, Term};
use std::io;

/// Translate a key press into a pager event.
pub fn key_to_event(key: &Key) -> NavEvent {
    match key {
        Key::ArrowLeft | Key::Char('p') | Key::Char('h') => NavEvent::Previous,
        Key::ArrowRight | Key::Char('n') | Key::Char('l') => NavEvent::Next,
        Key::Home | Key::Char('g') => NavEvent::First,
        Key::End | Key::Char('G') => NavEvent::Last,
        Key::Char('d') => NavEvent::ShowDiff,
        Key::Escape | Key::Char('q') | Key::Char('\u{3}') => NavEvent::Quit,
        _ => NavEvent::Ignored,
    }
}

/// Page through `versions`, starting at the current one, until the user quits.
pub fn run_history_view(term: &Term, name: &str, versions: &[Version]) -> io::Result<()> {
    let color = term.features().colors_supported();
    let mut index = versions.len().saturating_sub(1);
    term.hide_cursor()?;
    let result = view_loop(term, name, versions, &mut index, color);
    term.show_cursor()?;
    term.clear_screen()?;
    result
}

fn view_loop(
    term: &Term,
    name: &str,
    versions: &[Version],
    index: &mut usize,
    color: bool,
) -> io::Result<()> {
    loop {
        if versions.is_empty() {
            return Ok(());
        }
        term.clear_screen()?;
        term.write_line(&format_version_view(name, versions, *index, color))?;

        let event = match term.read_key() {
            Ok(key) => key_to_event(&key),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => NavEvent::Quit,
            Err(e) => return Err(e),
        };

        match navigate(versions.len(), *index, event) {
            NavOutcome::Show(next) => *index = next,
            NavOutcome::ShowDiff(at) => {
                term.clear_screen()?;
                let body = match &versions[at].patch {
                    Some(patch) => render_patch(patch, color),
                    None => "This is the current version; nothing changed after it.".to_string(),
                };
                term.write_line(&format!(
                    "{}: change after version {}\n\n{}\n\n[any key] back",
                    name,
                    at + 1,
                    body
                ))?;
                if let Err(e) = term.read_key() {
                    if e.kind() == io::ErrorKind::Interrupted {
                        return Ok(());
                    }
                    return Err(e);
                }
            }
            NavOutcome::Quit => return Ok(()),
        }
    }
}
