//! Terminal output.

use chorus_application::ChatState;
use chorus_core::persona::{Persona, PersonaRegistry};
use chorus_core::session::{ChatSession, Message, MessageRole};
use chorus_core::settings::Settings;
use colored::{Color, Colorize};

/// Maps a persona color tag to a terminal color.
pub fn persona_color(tag: &str) -> Color {
    match tag {
        "pink" | "purple" => Color::Magenta,
        other => other.parse().unwrap_or(Color::BrightBlue),
    }
}

/// Short description of an image data URI; the payload itself is not shown.
pub fn describe_image(image_url: &str) -> String {
    let mime = image_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(';'))
        .map(|(mime, _)| mime)
        .unwrap_or("image");
    let payload = image_url.split_once(',').map(|(_, data)| data.len()).unwrap_or(0);
    format!("[image: {}, {} base64 chars]", mime, payload)
}

pub fn print_message(message: &Message, persona: &Persona) {
    match message.role {
        MessageRole::User => {
            for line in message.content.lines() {
                println!("{}", format!("> {}", line).green());
            }
        }
        MessageRole::Model => {
            let color = persona_color(&persona.color_tag);
            println!("{}", format!("[{}]", persona.display_name).color(color).bold());
            for line in message.content.lines() {
                println!("{}", line.color(color));
            }
            if let Some(image_url) = &message.image_url {
                println!("{}", describe_image(image_url).bright_yellow());
            }
            if let Some(citations) = &message.citations {
                println!("{}", "Sources:".bright_black());
                for (index, citation) in citations.iter().enumerate() {
                    println!(
                        "{}",
                        format!("  [{}] {} - {}", index + 1, citation.title, citation.uri)
                            .bright_black()
                    );
                }
            }
        }
    }
    println!();
}

pub fn print_session(session: &ChatSession, registry: &PersonaRegistry) {
    let Ok(persona) = registry.get(&session.persona_id) else {
        eprintln!("{}", format!("Unknown persona '{}'", session.persona_id).red());
        return;
    };
    println!(
        "{}",
        format!("=== {} ({}) ===", session.title, persona.display_name)
            .bright_magenta()
            .bold()
    );
    for message in &session.messages {
        print_message(message, persona);
    }
}

pub fn print_sessions(state: &ChatState, registry: &PersonaRegistry) {
    if state.store.is_empty() {
        println!("{}", "No sessions. Use /new to start one.".bright_black());
        return;
    }
    for (index, session) in state.store.sessions().iter().enumerate() {
        let marker = if state.store.active_id() == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        let persona = registry
            .get(&session.persona_id)
            .map(|p| p.display_name.as_str())
            .unwrap_or("?");
        println!(
            "{} {:>2}. {} {} {}",
            marker,
            index + 1,
            session.title,
            format!("[{}]", persona).bright_black(),
            session
                .last_updated
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }
}

pub fn print_personas(registry: &PersonaRegistry, active: Option<&str>) {
    for persona in registry.all() {
        let marker = if active == Some(persona.id.as_str()) { "*" } else { " " };
        println!(
            "{} {} {}",
            marker,
            persona.id.color(persona_color(&persona.color_tag)).bold(),
            format!("({})", persona.display_name).bright_black()
        );
    }
}

pub fn print_settings(settings: &Settings) {
    let flag = |on: bool| if on { "on" } else { "off" };
    println!(
        "{}",
        format!(
            "image: {}  search: {}  theme: {}  user: {}",
            flag(settings.generation_flags.use_image_gen),
            flag(settings.generation_flags.use_live_search),
            settings.theme,
            settings.anonymous_id
        )
        .bright_black()
    );
}

pub fn print_help() {
    let lines = [
        ("/new [persona]", "start a new session"),
        ("/sessions", "list sessions (* marks the active one)"),
        ("/switch N", "switch to session N"),
        ("/delete N", "delete session N"),
        ("/rename TITLE", "rename the active session"),
        ("/persona ID", "change persona"),
        ("/personas", "list personas"),
        ("/image on|off", "toggle image generation"),
        ("/search on|off", "toggle live search"),
        ("/theme light|dark|auto", "set the theme"),
        ("/key", "enter an API key"),
        ("/wipe", "delete all sessions"),
        ("/quit", "exit"),
    ];
    for (command, description) in lines {
        println!("  {:<24} {}", command.bright_cyan(), description.bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_color_mapping() {
        assert_eq!(persona_color("blue"), Color::Blue);
        assert_eq!(persona_color("red"), Color::Red);
        assert_eq!(persona_color("pink"), Color::Magenta);
        assert_eq!(persona_color("chartreuse"), Color::BrightBlue);
    }

    #[test]
    fn test_describe_image() {
        assert_eq!(
            describe_image("data:image/png;base64,QUJD"),
            "[image: image/png, 4 base64 chars]"
        );
        assert_eq!(describe_image("garbage"), "[image: image, 0 base64 chars]");
    }
}
