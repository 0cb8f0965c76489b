// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use time::macros::format_description;
use time::{Date, Time};

/// Inline contact creation from the owner picker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactForm {
    pub name: String,
    pub credentials: String,
    pub next_project: String,
}

impl ContactForm {
    pub fn from_query(query: &str) -> Self {
        Self {
            name: query.trim().to_owned(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("contact name is required -- type a name and retry");
        }
        let hint = self.next_project.trim();
        if !hint.is_empty() && !hint.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic()) {
            bail!("next project must look like PM1.2 -- pathway letters then a code");
        }
        Ok(())
    }

    /// Form fields as sent to the contact endpoint.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("first_name", self.name.trim().to_owned()),
            ("credentials", self.credentials.trim().to_owned()),
            ("next_project", self.next_project.trim().to_owned()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub meeting_date: Date,
    pub start_time: Time,
    pub meeting_type: String,
}

impl NewMeeting {
    /// Parses the raw prompt values: `YYYY-MM-DD`, `HH:MM`, and a type name.
    pub fn parse(date: &str, start_time: &str, meeting_type: &str) -> Result<Self> {
        let meeting_date = Date::parse(date.trim(), &format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("meeting date {date:?} is not YYYY-MM-DD"))?;
        let start_time = Time::parse(start_time.trim(), &format_description!("[hour]:[minute]"))
            .with_context(|| format!("start time {start_time:?} is not HH:MM"))?;
        let meeting = Self {
            meeting_date,
            start_time,
            meeting_type: meeting_type.trim().to_owned(),
        };
        meeting.validate()?;
        Ok(meeting)
    }

    pub fn validate(&self) -> Result<()> {
        if self.meeting_type.is_empty() {
            bail!("meeting type is required -- choose a meeting type and retry");
        }
        Ok(())
    }

    /// Multipart fields for the create endpoint.
    pub fn fields(&self) -> Result<Vec<(&'static str, String)>> {
        let date = self
            .meeting_date
            .format(&format_description!("[year]-[month]-[day]"))
            .context("format meeting date")?;
        let time = self
            .start_time
            .format(&format_description!("[hour]:[minute]"))
            .context("format start time")?;
        Ok(vec![
            ("meeting_date", date),
            ("start_time", time),
            ("meeting_type", self.meeting_type.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactForm, NewMeeting};
    use anyhow::Result;
    use time::macros::{date, time};

    #[test]
    fn contact_requires_name() {
        let error = ContactForm::from_query("   ")
            .validate()
            .expect_err("blank name should fail");
        assert!(error.to_string().contains("contact name is required"));
    }

    #[test]
    fn contact_rejects_malformed_project_hint() {
        let form = ContactForm {
            name: "Sam Lee".to_owned(),
            credentials: String::new(),
            next_project: "1.2".to_owned(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn contact_fields_are_trimmed() -> Result<()> {
        let form = ContactForm {
            name: " Sam Lee ".to_owned(),
            credentials: "CC ".to_owned(),
            next_project: "PM1.1".to_owned(),
        };
        form.validate()?;
        assert_eq!(
            form.fields(),
            vec![
                ("first_name", "Sam Lee".to_owned()),
                ("credentials", "CC".to_owned()),
                ("next_project", "PM1.1".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn new_meeting_parses_prompt_values() -> Result<()> {
        let meeting = NewMeeting::parse("2026-03-05", "19:30", "Regular")?;
        assert_eq!(meeting.meeting_date, date!(2026 - 03 - 05));
        assert_eq!(meeting.start_time, time!(19:30));
        assert_eq!(
            meeting.fields()?,
            vec![
                ("meeting_date", "2026-03-05".to_owned()),
                ("start_time", "19:30".to_owned()),
                ("meeting_type", "Regular".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn new_meeting_rejects_bad_input() {
        assert!(NewMeeting::parse("03/05/2026", "19:30", "Regular").is_err());
        assert!(NewMeeting::parse("2026-03-05", "7pm", "Regular").is_err());
        let error = NewMeeting::parse("2026-03-05", "19:30", " ")
            .expect_err("blank type should fail");
        assert!(error.to_string().contains("meeting type is required"));
    }
}
