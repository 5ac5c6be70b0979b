//! Lead pipeline commands.

use zenthra_core::{Lead, LeadId, LeadPriority, LeadStatus, LeadSubmission, LeadUpdate};
use zenthra_leads::Stores;

use super::CliError;

/// List leads, newest first, optionally filtered by pipeline stage.
pub async fn list(stores: &Stores, status: Option<&str>) -> Result<(), CliError> {
    stores.leads.fetch_leads().await;
    report_fetch_error(stores);

    let leads = match status {
        Some(raw) => {
            let status: LeadStatus = raw.parse().map_err(CliError::InvalidArgument)?;
            stores.leads.leads_by_status(status)
        }
        None => stores.leads.leads(),
    };

    if leads.is_empty() {
        println!("no leads");
        return Ok(());
    }

    for lead in &leads {
        println!("{}", summary_line(lead));
    }
    println!("{} lead(s)", leads.len());
    Ok(())
}

/// Show one lead in full.
pub async fn show(stores: &Stores, id: &str) -> Result<(), CliError> {
    stores.leads.fetch_leads().await;
    report_fetch_error(stores);

    let lead = stores
        .leads
        .lead_by_id(&LeadId::new(id))
        .ok_or_else(|| CliError::UnknownLead(id.to_owned()))?;

    println!("id:       {}", lead.id);
    println!("name:     {}", lead.name);
    println!("email:    {}", lead.email);
    if let Some(company) = &lead.company {
        println!("company:  {company}");
    }
    println!("subject:  {}", lead.subject);
    println!("status:   {}", lead.status);
    println!("priority: {}", lead.priority);
    println!("created:  {}", lead.created_at.to_rfc3339());
    println!("updated:  {}", lead.updated_at.to_rfc3339());
    if let Some(notes) = &lead.notes {
        println!("notes:    {notes}");
    }
    println!();
    println!("{}", lead.message);
    Ok(())
}

/// Free-text search over the fetched collection.
pub async fn search(stores: &Stores, query: &str) -> Result<(), CliError> {
    stores.leads.fetch_leads().await;
    report_fetch_error(stores);

    let hits = stores.leads.search(query);
    for lead in &hits {
        println!("{}", summary_line(lead));
    }
    println!("{} match(es) for \"{query}\"", hits.len());
    Ok(())
}

/// Capture a new lead the way the public contact form does.
pub async fn add(
    stores: &Stores,
    name: String,
    email: String,
    company: Option<String>,
    subject: String,
    message: String,
) -> Result<(), CliError> {
    let lead = stores
        .leads
        .add_lead(LeadSubmission {
            name,
            email,
            company,
            subject,
            message,
        })
        .await?;

    println!("created lead {} ({} / {})", lead.id, lead.status, lead.priority);
    Ok(())
}

/// Move a lead to another pipeline stage.
pub async fn set_status(stores: &Stores, id: &str, status: &str) -> Result<(), CliError> {
    let status: LeadStatus = status.parse().map_err(CliError::InvalidArgument)?;
    let lead = stores
        .leads
        .update_lead(&LeadId::new(id), LeadUpdate::status(status))
        .await?;
    println!("{} -> {}", lead.id, lead.status);
    Ok(())
}

/// Reassign a lead's priority.
pub async fn set_priority(stores: &Stores, id: &str, priority: &str) -> Result<(), CliError> {
    let priority: LeadPriority = priority.parse().map_err(CliError::InvalidArgument)?;
    let lead = stores
        .leads
        .update_lead(&LeadId::new(id), LeadUpdate::priority(priority))
        .await?;
    println!("{} -> {}", lead.id, lead.priority);
    Ok(())
}

/// Replace the operator notes on a lead.
pub async fn note(stores: &Stores, id: &str, text: &str) -> Result<(), CliError> {
    let lead = stores
        .leads
        .update_lead(&LeadId::new(id), LeadUpdate::notes(text))
        .await?;
    println!("noted {}", lead.id);
    Ok(())
}

/// Delete a lead.
pub async fn delete(stores: &Stores, id: &str) -> Result<(), CliError> {
    stores.leads.delete_lead(&LeadId::new(id)).await?;
    println!("deleted {id}");
    Ok(())
}

fn summary_line(lead: &Lead) -> String {
    let company = lead.company.as_deref().unwrap_or("-");
    format!(
        "{}  [{:>9}/{:<6}]  {}  <{}>  {}  {}",
        lead.id,
        lead.status.to_string(),
        lead.priority.to_string(),
        lead.name,
        lead.email,
        company,
        lead.subject,
    )
}

/// Fetch failures never throw; surface the shared error field instead.
fn report_fetch_error(stores: &Stores) {
    if let Some(error) = stores.leads.error() {
        tracing::warn!("fetch reported: {error}");
    }
}
