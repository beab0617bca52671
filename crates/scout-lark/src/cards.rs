//! Card document builders.
//!
//! Pure functions mapping issue metadata and analysis records to the
//! interactive-card JSON the chat platform renders. Cards are built fresh
//! per send and discarded after transmission.

use chrono::Utc;
use serde_json::{json, Value};

use scout_ai::{ContributionPlan, IssueAnalysis};
use scout_github::Issue;

const DIGEST_RECOMMENDATION_CAP: usize = 5;

/// Header template color for a difficulty label; anything outside the three
/// known tiers renders blue.
pub fn header_color(difficulty: &str) -> &'static str {
    match difficulty {
        "beginner" => "green",
        "intermediate" => "orange",
        "advanced" => "red",
        _ => "blue",
    }
}

fn note_element(content: String) -> Value {
    json!({
        "tag": "note",
        "elements": [{"tag": "plain_text", "content": content}]
    })
}

fn markdown_div(content: String) -> Value {
    json!({
        "tag": "div",
        "text": {"tag": "lark_md", "content": content}
    })
}

/// Builds the per-issue recommendation card.
pub fn build_issue_card(repo_slug: &str, issue: &Issue, analysis: &IssueAnalysis) -> Value {
    let difficulty = analysis.difficulty_level.as_str();
    let mut title: String = issue.title.chars().take(50).collect();
    title.insert_str(0, "🚀 Recommended issue: ");

    json!({
        "config": {"wide_screen_mode": true},
        "header": {
            "title": {"tag": "plain_text", "content": title},
            "template": header_color(difficulty)
        },
        "elements": [
            markdown_div(format!(
                "**Project**: {repo_slug}\n**Issue**: #{number} - [{title}]({url})",
                number = issue.number,
                title = issue.title,
                url = issue.html_url,
            )),
            {"tag": "hr"},
            {
                "tag": "div",
                "fields": [
                    {
                        "is_short": true,
                        "text": {"tag": "lark_md", "content": format!("**Difficulty**: {difficulty}")}
                    },
                    {
                        "is_short": true,
                        "text": {"tag": "lark_md", "content": format!("**Estimated time**: {}", analysis.estimated_time)}
                    },
                    {
                        "is_short": false,
                        "text": {"tag": "lark_md", "content": format!("**Required skills**: {}", analysis.required_skills.join(", "))}
                    }
                ]
            },
            markdown_div(format!(
                "**Solution approach**:\n{}",
                analysis.solution_approach
            )),
            markdown_div(format!(
                "**Learning opportunities**:\n{}",
                analysis.learning_opportunities.join("\n")
            )),
            {"tag": "hr"},
            {
                "tag": "action",
                "actions": [
                    {
                        "tag": "button",
                        "text": {"tag": "plain_text", "content": "View issue"},
                        "type": "primary",
                        "url": issue.html_url
                    },
                    {
                        "tag": "button",
                        "text": {"tag": "plain_text", "content": "Start contributing"},
                        "type": "default",
                        "url": format!("{}#issuecomment", issue.html_url)
                    }
                ]
            },
            note_element(format!(
                "Generated at: {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            ))
        ]
    })
}

#[derive(Debug, Clone)]
/// A monitored project line in the daily digest.
pub struct DigestProject {
    pub name: String,
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone)]
/// One recommendation entry in the daily digest.
pub struct DigestRecommendation {
    pub title: String,
    pub url: String,
    pub difficulty: String,
    pub estimated_time: String,
    pub required_skills: Vec<String>,
    pub solution_approach: String,
    pub technical_breakdown: String,
}

/// Builds the daily-digest card: monitored projects, counts, and up to five
/// recommendation blocks separated by dividers.
pub fn build_daily_digest_card(
    projects: &[DigestProject],
    issues_found: usize,
    recommendations: &[DigestRecommendation],
) -> Value {
    let project_list = projects
        .iter()
        .map(|p| format!("• {} ({}/{})", p.name, p.owner, p.repo))
        .collect::<Vec<_>>()
        .join("\n");

    let capped = &recommendations[..recommendations.len().min(DIGEST_RECOMMENDATION_CAP)];
    let mut elements = vec![
        markdown_div(format!(
            "**Monitored projects**:\n{project_list}\n\n**Issues found**: {issues_found} | **Recommended**: {}",
            capped.len(),
        )),
        json!({"tag": "hr"}),
    ];

    for (index, rec) in capped.iter().enumerate() {
        elements.push(markdown_div(format!(
            "**{rank}. [{title}]({url})**\n\
             🔸 **Difficulty**: {difficulty} | ⏳ **Estimated time**: {time}\n\
             🎯 **Required skills**: {skills}\n\
             💡 **Solution approach**: {approach}\n\
             🛠 **Technical breakdown**: {breakdown}",
            rank = index + 1,
            title = rec.title,
            url = rec.url,
            difficulty = rec.difficulty,
            time = rec.estimated_time,
            skills = rec.required_skills.join(", "),
            approach = rec.solution_approach,
            breakdown = rec.technical_breakdown,
        )));
        if index + 1 < capped.len() {
            elements.push(json!({"tag": "hr"}));
        }
    }

    elements.push(json!({"tag": "hr"}));
    elements.push(note_element(format!(
        "Report time: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )));

    json!({
        "config": {"wide_screen_mode": true},
        "header": {
            "title": {"tag": "plain_text", "content": "📊 Daily contribution digest"},
            "template": "blue"
        },
        "elements": elements
    })
}

/// Builds the personalized contribution-plan card.
pub fn build_plan_card(issue: &Issue, plan: &ContributionPlan) -> Value {
    json!({
        "config": {"wide_screen_mode": true},
        "header": {
            "title": {"tag": "plain_text", "content": "📝 Personalized contribution plan"},
            "template": "purple"
        },
        "elements": [
            markdown_div(format!(
                "**Issue**: [{title}]({url})\n**Generated at**: {generated_at}",
                title = issue.title,
                url = issue.html_url,
                generated_at = plan.generated_at,
            )),
            markdown_div(plan.plan.clone())
        ]
    })
}
