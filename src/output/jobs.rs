use crate::jobs::CrawlJob;
use chrono::NaiveDateTime;
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats the job list, one block per job
pub fn format_jobs(jobs: &[CrawlJob]) -> String {
    let mut out = String::new();

    if jobs.is_empty() {
        out.push_str("No crawl jobs configured\n");
        return out;
    }

    let _ = writeln!(out, "=== Crawl Jobs ({}) ===\n", jobs.len());
    for job in jobs {
        let schedule = if job.schedule_type.uses_time_of_day() {
            format!("{} at {}", job.schedule_type, job.schedule_time)
        } else {
            job.schedule_type.to_string()
        };

        let _ = writeln!(out, "[{}] {} ({})", job.id, job.name, job.status);
        let _ = writeln!(out, "  Schedule: {}", schedule);
        let _ = writeln!(
            out,
            "  Limits: {} pages, depth {}",
            job.max_pages, job.max_depth
        );
        let _ = writeln!(out, "  Seeds: {}", job.seed_urls.join(", "));
        let _ = writeln!(out, "  Last run: {}", time_or_never(job.last_run));
        let _ = writeln!(out, "  Next run: {}", time_or_never(job.next_run));
        out.push('\n');
    }

    out
}

pub fn print_jobs(jobs: &[CrawlJob]) {
    print!("{}", format_jobs(jobs));
}

fn time_or_never(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "never".to_string())
}
