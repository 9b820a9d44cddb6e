//! Contact email template

use crate::config::MailSettings;
use crate::mail::OutgoingMail;
use crate::submission::ContactSubmission;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactTemplate {
    site_name: String,
    sender_email: String,
    receiver_email: String,
}

impl ContactTemplate {
    pub fn new(
        site_name: impl Into<String>,
        sender_email: impl Into<String>,
        receiver_email: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            sender_email: sender_email.into(),
            receiver_email: receiver_email.into(),
        }
    }

    pub fn from_settings(site_name: &str, mail: &MailSettings) -> Self {
        Self::new(site_name, &mail.sender_email, &mail.receiver_email)
    }

    pub fn receiver(&self) -> &str {
        &self.receiver_email
    }

    /// Build the email for a submission. Reply-To carries the visitor's phone.
    pub fn compose(&self, submission: &ContactSubmission) -> OutgoingMail {
        OutgoingMail {
            from: format!(
                "\"{} Contact Form\" <{}>",
                self.site_name.replace('"', "'"),
                self.sender_email
            ),
            to: self.receiver_email.clone(),
            reply_to: Some(submission.phone().to_string()),
            subject: format!("New Contact Form Message from {}", submission.name()),
            text: self.text_body(submission),
            html: self.html_body(submission),
        }
    }

    fn text_body(&self, submission: &ContactSubmission) -> String {
        format!(
            "New message from {site} website:\n\
             \n\
             Name: {name}\n\
             Phone: {phone}\n\
             \n\
             Message:\n\
             {message}\n\
             \n\
             ---\n\
             This email was sent from the contact form at {site} website.\n",
            site = self.site_name,
            name = submission.name(),
            phone = submission.phone(),
            message = submission.message(),
        )
    }

    fn html_body(&self, submission: &ContactSubmission) -> String {
        let site = escape_html(&self.site_name);
        let name = escape_html(submission.name());
        let phone = escape_html(submission.phone());
        let message = escape_html(submission.message());

        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #e0e0e0; border-radius: 8px;">
  <h2 style="color: #2E8B57; border-bottom: 2px solid #2E8B57; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="margin: 20px 0;">
    <p style="margin: 10px 0;"><strong>Name:</strong> {name}</p>
    <p style="margin: 10px 0;"><strong>Phone:</strong> <a href="tel:{phone}">{phone}</a></p>
  </div>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p style="margin: 0;"><strong>Message:</strong></p>
    <p style="margin: 10px 0; white-space: pre-wrap;">{message}</p>
  </div>
  <hr style="border: none; border-top: 1px solid #e0e0e0; margin: 20px 0;">
  <p style="font-size: 12px; color: #666; text-align: center;">This email was sent from the contact form at {site} website.</p>
</div>
"#
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
