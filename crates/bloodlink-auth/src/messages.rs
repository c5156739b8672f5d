//! Message text for codes and account notices.

const SIGNATURE: &str = "Best regards,\nBlood Bank Management Team";

pub(crate) const OTP_EMAIL_SUBJECT: &str = "Your verification code - Blood Bank Management System";
pub(crate) const RESET_EMAIL_SUBJECT: &str = "Password Reset Link - Blood Bank Management System";
pub(crate) const WELCOME_EMAIL_SUBJECT: &str = "Welcome to Blood Bank Management System";

fn greeting(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Dear {name},"),
        None => "Hello,".to_string(),
    }
}

pub(crate) fn otp_email(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Hello,\n\nYour email verification code is: {code}\n\n\
         The code expires in {ttl_minutes} minutes and can be used once.\n\n{SIGNATURE}"
    )
}

pub(crate) fn otp_sms(code: &str, ttl_minutes: i64) -> String {
    format!("Blood Bank verification code: {code}. Valid for {ttl_minutes} minutes.")
}

pub(crate) fn reset_email(
    name: Option<&str>,
    email: &str,
    token: &str,
    link_base: &str,
    ttl_minutes: i64,
) -> String {
    let link = format!("{link_base}?token={token}&email={email}");
    format!(
        "{}\n\nYou have requested to reset your password for the Blood Bank Management System.\n\n\
         Please open the following link to reset your password:\n{link}\n\n\
         Or enter this reset token in the password reset form: {token}\n\n\
         This link and token will expire in {ttl_minutes} minutes. \
         If you did not request this reset, please ignore this email.\n\n{SIGNATURE}",
        greeting(name)
    )
}

pub(crate) fn welcome_email(username: &str) -> String {
    format!(
        "Dear {username},\n\nWelcome to the Blood Bank Management System!\n\n\
         Your account has been successfully created. You can now:\n\
         - Donate blood and track your donations\n\
         - Request blood when needed\n\
         - View real-time blood inventory\n\n\
         Thank you for joining our life-saving community!\n\n{SIGNATURE}"
    )
}
