//! Prompt rendering for issue, project, and contribution-plan analysis.
//!
//! Pure functions: issue fields plus documentation excerpts in, instruction
//! text out. Excerpts are truncated to fixed character budgets so prompt
//! size stays bounded regardless of repository documentation size.

use scout_core::truncate_chars;
use scout_github::{Issue, Repository};

use crate::types::IssueAnalysis;

const BODY_BUDGET: usize = 1000;
const DOC_BUDGET: usize = 500;

pub const ISSUE_SYSTEM_PROMPT: &str = "You are an expert on big-data open-source projects who helps developers \
     evaluate GitHub issues. Assess technical complexity, required skills, \
     a solution approach, and an estimated time to resolve.";

pub const PROJECT_SYSTEM_PROMPT: &str = "You are an open-source community expert who evaluates how friendly a \
     project is to new contributors: community health, maintenance \
     activity, and beginner friendliness.";

pub const PLAN_SYSTEM_PROMPT: &str =
    "You are an open-source contribution mentor providing personalized guidance.";

/// Renders the issue-analysis instruction.
///
/// Enumerates the exact JSON field names the model must return so the
/// extraction step has a stable contract to parse against.
pub fn issue_analysis_prompt(issue: &Issue, readme: &str, contributing: &str) -> String {
    let contributing_excerpt = if contributing.is_empty() {
        "no contributing guide".to_string()
    } else {
        truncate_chars(contributing, DOC_BUDGET)
    };

    format!(
        "Analyze the following GitHub issue and evaluate its technical \
         complexity and contribution feasibility.\n\n\
         Issue title: {title}\n\
         Issue body: {body}\n\
         Labels: {labels}\n\
         Created at: {created_at}\n\
         Comment count: {comments}\n\n\
         Project README excerpt:\n{readme}\n\n\
         Contributing guide excerpt:\n{contributing}\n\n\
         Reply with a JSON object containing exactly these fields:\n\
         1. complexity_score: complexity rating (0-1)\n\
         2. difficulty_level: one of beginner/intermediate/advanced\n\
         3. required_skills: list of required skills\n\
         4. estimated_time: estimated time to resolve (e.g. 2-4 hours, 1-2 days)\n\
         5. solution_approach: solution outline (under 200 words)\n\
         6. technical_breakdown: map of files/techniques involved\n\
         7. learning_opportunities: list of things a contributor would learn\n\
         8. confidence_score: confidence in this analysis (0-1)\n\n\
         Notes:\n\
         1. If the issue belongs to a big-data project (Spark, Flink, Kafka, \
         and the like), account for distributed-systems characteristics.\n\
         2. Consider whether deep knowledge of the project architecture is needed.\n\
         3. Consider testing and documentation requirements.",
        title = issue.title,
        body = if issue.body.is_empty() {
            "no description".to_string()
        } else {
            truncate_chars(&issue.body, BODY_BUDGET)
        },
        labels = issue.labels.join(", "),
        created_at = issue.created_at.to_rfc3339(),
        comments = issue.comments,
        readme = truncate_chars(readme, DOC_BUDGET),
        contributing = contributing_excerpt,
    )
}

/// Renders the project-analysis instruction from repository metadata and a
/// small issue sample.
pub fn project_analysis_prompt(repository: &Repository, issue_sample: &[Issue]) -> String {
    let mut sample = String::new();
    for issue in issue_sample {
        sample.push_str(&format!(
            "- #{} {} [labels: {}] ({} comments)\n",
            issue.number,
            issue.title,
            issue.labels.join(", "),
            issue.comments,
        ));
    }
    if sample.is_empty() {
        sample.push_str("(no labeled issues found)\n");
    }

    format!(
        "Evaluate how contributor-friendly the following project is.\n\n\
         Project: {name}\n\
         Description: {description}\n\
         Primary language: {language}\n\
         Stars: {stars} | Forks: {forks} | Open issues: {open_issues}\n\
         Last updated: {updated_at}\n\n\
         Sample of beginner-labeled issues:\n{sample}\n\
         Reply with a JSON object containing exactly these fields:\n\
         1. beginner_friendliness: rating (0-1)\n\
         2. active_maintenance: boolean\n\
         3. community_health: map of community indicators\n\
         4. contribution_guidelines: map describing the contribution process\n\
         5. tech_stack_analysis: map of the technology stack\n\
         6. recommended_issues: list of issue ids from the sample worth starting with",
        name = repository.full_name,
        description = repository.description.as_deref().unwrap_or("none"),
        language = repository.language.as_deref().unwrap_or("unknown"),
        stars = repository.stargazers_count,
        forks = repository.forks_count,
        open_issues = repository.open_issues_count,
        updated_at = repository.updated_at.to_rfc3339(),
        sample = sample,
    )
}

/// Renders the personalized contribution-plan instruction.
pub fn plan_prompt(issue: &Issue, analysis: &IssueAnalysis, user_skills: &[String]) -> String {
    format!(
        "Based on the following information, produce a detailed contribution \
         plan for this developer.\n\n\
         Issue:\n\
         - Title: {title}\n\
         - Body: {body}\n\n\
         Analysis:\n\
         - Difficulty: {difficulty}\n\
         - Required skills: {skills}\n\
         - Solution approach: {approach}\n\n\
         Developer skills: {user_skills}\n\n\
         The plan should cover:\n\
         1. Suggested learning path\n\
         2. Code reading guide\n\
         3. Concrete implementation steps\n\
         4. Testing suggestions\n\
         5. Pull-request submission notes\n\
         6. Estimated timeline",
        title = issue.title,
        body = truncate_chars(&issue.body, DOC_BUDGET),
        difficulty = analysis.difficulty_level.as_str(),
        skills = analysis.required_skills.join(", "),
        approach = truncate_chars(&analysis.solution_approach, 200),
        user_skills = user_skills.join(", "),
    )
}
