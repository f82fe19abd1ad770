//! Terminal rendering

use colored::{ColoredString, Colorize};
use serde::Serialize;

use skillmatrix_core::photo;
use skillmatrix_core::storage::EntryInfo;
use skillmatrix_core::{
    AssignedSkill, Collaborator, CollaboratorCard, CollaboratorId, MatrixError, MatrixStore,
    RadarPoint, Rating, RecognitionReport, RecognitionStatus, SkillCategory, SkillRating,
};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}

/// User-facing notification for errors the user can fix
pub fn notify_error(err: &MatrixError) {
    let tag = match err {
        MatrixError::Constraint(_) => "Not allowed:".red().bold(),
        MatrixError::NotFound { .. } => "Not found:".yellow().bold(),
        _ => "Invalid input:".yellow().bold(),
    };
    eprintln!("{} {}", tag, err);
}

fn dots(rating: Rating) -> ColoredString {
    match rating.value() {
        None => "N/A".dimmed(),
        Some(level) => {
            let filled = "●".repeat(usize::from(level));
            let empty = "○".repeat(usize::from(Rating::MAX_LEVEL - level));
            format!("{}{}", filled, empty).cyan()
        }
    }
}

fn apt_badge(is_apt: bool) -> ColoredString {
    if is_apt {
        "apt".green()
    } else {
        "".normal()
    }
}

fn category_tag(category: SkillCategory) -> ColoredString {
    match category {
        SkillCategory::Knowledge => category.label().blue(),
        SkillCategory::Hard => category.label().magenta(),
        SkillCategory::Soft => category.label().yellow(),
    }
}

fn status_tag(status: RecognitionStatus) -> ColoredString {
    match status {
        RecognitionStatus::Eligible => status.label().green().bold(),
        RecognitionStatus::Developing => status.label().yellow(),
        RecognitionStatus::NeedsAttention => status.label().red().bold(),
    }
}

pub fn collaborators(
    store: &MatrixStore,
    collaborators: &[Collaborator],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(collaborators);
    }
    if collaborators.is_empty() {
        warning("No collaborators");
        return Ok(());
    }
    for c in collaborators {
        let focal = if c.is_focal { "★".yellow().bold() } else { " ".normal() };
        println!(
            "{} {:<28} {:<24} {} skill(s)  {}",
            focal,
            c.name.bold(),
            store.team_name(&c.team_id),
            c.skills.len(),
            c.id.to_string().dimmed()
        );
    }
    Ok(())
}

pub fn card(card: &CollaboratorCard, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(card);
    }
    let c = &card.collaborator;
    let focal = if c.is_focal { " ★ focal".yellow().bold() } else { "".normal() };
    println!("[{}] {}{}", card.initials.bold(), c.name.bold(), focal);
    println!("    Team:  {}", card.team_name);
    println!("    Id:    {}", c.id.to_string().dimmed());
    if !photo::is_data_uri(&c.photo) {
        println!("    Photo: {}", c.photo.dimmed());
    }

    if card.assigned().next().is_none() {
        println!();
        warning("No skills assigned");
        return Ok(());
    }
    print_group("Knowledge", &card.knowledge);
    print_group("Skills", &card.other);
    Ok(())
}

fn print_group(title: &str, skills: &[AssignedSkill]) {
    if skills.is_empty() {
        return;
    }
    println!();
    println!("  {}", title.bold().underline());
    for assigned in skills {
        println!(
            "    {:<24} {:<6} {:<10} {}",
            assigned.skill.name,
            dots(assigned.rating),
            category_tag(assigned.skill.category),
            apt_badge(assigned.is_apt)
        );
    }
}

pub fn rating_changed(
    store: &MatrixStore,
    collaborator: &CollaboratorId,
    entry: &SkillRating,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(entry);
    }
    let who = store
        .collaborator(collaborator)
        .map_or_else(|| collaborator.to_string(), |c| c.name);
    let what = store
        .skill(&entry.skill_id)
        .map_or_else(|| entry.skill_id.to_string(), |s| s.name);
    success(&format!(
        "{} / {}: {} ({})",
        who,
        what,
        dots(entry.rating),
        entry.rating.label()
    ));
    Ok(())
}

pub fn radar(points: &[RadarPoint], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(points);
    }
    if points.is_empty() {
        warning("Not enough data for a radar chart");
        return Ok(());
    }
    for point in points {
        let bar = "█".repeat(usize::from(point.value) * 4);
        println!(
            "  {:<24} {:<20} {}/{}  {}",
            point.subject,
            bar.cyan(),
            point.value,
            point.full_mark,
            category_tag(point.category)
        );
    }
    Ok(())
}

pub fn recognition(
    store: &MatrixStore,
    report: &RecognitionReport,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }
    if report.rows.is_empty() {
        warning("No collaborators");
        return Ok(());
    }
    println!(
        "{}",
        format!(
            "{:<28} {:<24} {:>6} {:>12}  {}",
            "Collaborator", "Team", "Apt", "Independent", "Status"
        )
        .bold()
    );
    for row in &report.rows {
        println!(
            "{:<28} {:<24} {:>5}% {:>11}%  {}",
            row.name,
            store.team_name(&row.team_id),
            row.apt_percentage,
            row.independent_percentage,
            status_tag(row.status)
        );
    }

    let attention: Vec<_> = report.needing_attention().map(|r| r.name.as_str()).collect();
    if !attention.is_empty() {
        println!();
        println!(
            "{} {}",
            "Needs attention:".red().bold(),
            attention.join(", ")
        );
    }
    println!();
    println!(
        "{}",
        format!(
            "Eligible at {}% apt, attention below {}%, independent from level {}",
            report.settings.eligible_threshold,
            report.settings.attention_threshold,
            report.settings.advanced_level
        )
        .dimmed()
    );
    Ok(())
}

/// Stored rows of the SQLite backend with their integrity hashes
pub fn entries(entries: &[EntryInfo], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(entries);
    }
    for entry in entries {
        let saved = chrono::DateTime::from_timestamp_millis(entry.saved_at_ms)
            .map_or_else(|| entry.saved_at_ms.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        let hash = entry.integrity_hash.get(..12).unwrap_or(&entry.integrity_hash);
        println!(
            "  {:<14} {:>8} bytes  {}  {}",
            entry.key,
            entry.size,
            saved,
            hash.dimmed()
        );
    }
    Ok(())
}

pub fn teams(store: &MatrixStore, json: bool) -> anyhow::Result<()> {
    let rows: Vec<_> = store
        .teams()
        .into_iter()
        .map(|team| {
            let members = store.team_member_count(&team.id);
            (team, members)
        })
        .collect();

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(team, members)| {
                serde_json::json!({ "id": team.id, "name": team.name, "members": members })
            })
            .collect();
        return print_json(&value);
    }
    for (team, members) in rows {
        println!(
            "  {:<28} {:>3} member(s)  {}",
            team.name.bold(),
            members,
            team.id.to_string().dimmed()
        );
    }
    let orphans = store.orphaned_collaborators();
    if !orphans.is_empty() {
        warning(&format!("{} collaborator(s) without a team", orphans.len()));
    }
    Ok(())
}

pub fn skills(store: &MatrixStore, json: bool) -> anyhow::Result<()> {
    let rows: Vec<_> = store
        .skills()
        .into_iter()
        .map(|skill| {
            let usage = store.skill_usage(&skill.id);
            (skill, usage)
        })
        .collect();

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(skill, usage)| {
                serde_json::json!({
                    "id": skill.id,
                    "name": skill.name,
                    "category": skill.category,
                    "collaborators": usage,
                })
            })
            .collect();
        return print_json(&value);
    }
    for category in SkillCategory::ALL {
        let in_category: Vec<_> = rows.iter().filter(|(s, _)| s.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!("{}", category_tag(category).bold());
        for (skill, usage) in in_category {
            println!(
                "  {:<28} {:>3} rated  {}",
                skill.name,
                usage,
                skill.id.to_string().dimmed()
            );
        }
    }
    Ok(())
}

pub fn legend(json: bool) -> anyhow::Result<()> {
    if json {
        let ratings: Vec<_> = Rating::ALL
            .iter()
            .map(|r| {
                serde_json::json!({
                    "rating": r,
                    "label": r.label(),
                    "description": r.description(),
                })
            })
            .collect();
        let categories: Vec<_> = SkillCategory::ALL
            .iter()
            .map(|c| serde_json::json!({ "category": c, "label": c.label() }))
            .collect();
        return print_json(&serde_json::json!({ "ratings": ratings, "categories": categories }));
    }

    println!("{}", "Ratings".bold().underline());
    for rating in Rating::ALL {
        println!(
            "  {:<4} {:<6} {:<16} {}",
            rating.to_string(),
            dots(rating),
            rating.label(),
            rating.description().dimmed()
        );
    }
    println!();
    println!("{}", "Categories".bold().underline());
    for category in SkillCategory::ALL {
        println!("  {}", category_tag(category));
    }
    println!();
    println!(
        "{} marks a collaborator qualified for the task, independent of the rating",
        "apt".green()
    );
    Ok(())
}
