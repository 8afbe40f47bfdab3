use mail_tools::{MailError, MailSender};
use mockall::mock;

mock! {
    pub MailBackend {}
    impl MailSender for MailBackend {
        async fn send<'a>(&self, to: &str, subject: &str, html: &str, text: Option<&'a str>) -> Result<(), MailError>;
    }
}
