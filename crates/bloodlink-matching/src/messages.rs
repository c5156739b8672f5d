//! Notification text for request matches and donor responses.

use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::blood_request::BloodRequest;

const SIGNATURE: &str = "Best regards,\nBlood Bank Management Team";

pub(crate) const MATCH_SUBJECT: &str = "Blood Request Match - Your Help Needed!";
pub(crate) const ACCEPT_SUBJECT: &str = "Good News! Donor Found for Your Blood Request";
pub(crate) const DECLINE_SUBJECT: &str = "Update on Your Blood Request";

pub(crate) fn match_email(donor: &str, donor_group: BloodGroup, request: &BloodRequest) -> String {
    format!(
        "Dear {donor},\n\n\
         A blood request has been submitted that matches your blood group!\n\n\
         REQUEST DETAILS:\n\
         - Blood Group Needed: {}\n\
         - Quantity: {} ml\n\
         - Urgency: {}\n\
         - Required By: {}\n\
         - Reason: {}\n\
         - Requester: {}\n\n\
         Your blood group ({donor_group}) is compatible with this request.\n\n\
         Please log in to respond to request {} and help save a life!\n\n\
         Thank you for being a life-saver!\n\n{SIGNATURE}",
        request.blood_group,
        request.quantity,
        request.urgency,
        request.required_date,
        request.reason,
        request.requester,
        request.id,
    )
}

pub(crate) fn match_sms(donor_group: BloodGroup, request: &BloodRequest) -> String {
    format!(
        "Blood Request Alert! {} blood needed ({}). Your {donor_group} blood can help! \
         Login to respond. Quantity: {}ml",
        request.blood_group, request.urgency, request.quantity
    )
}

pub(crate) fn accept_email(
    requester: &str,
    donor: &str,
    donor_group: Option<BloodGroup>,
    donor_phone: &str,
    quantity_offered: u32,
    message: Option<&str>,
    request: &BloodRequest,
) -> String {
    let group = donor_group.map_or("unknown", BloodGroup::as_str);
    format!(
        "Dear {requester},\n\n\
         Great news! A donor has responded to your blood request:\n\n\
         DONOR DETAILS:\n\
         - Donor: {donor}\n\
         - Blood Group: {group}\n\
         - Quantity Offered: {quantity_offered} ml\n\
         - Contact: {donor_phone}\n\n\
         ORIGINAL REQUEST:\n\
         - Blood Group: {}\n\
         - Quantity Needed: {} ml\n\
         - Urgency: {}\n\n\
         DONOR MESSAGE:\n{}\n\n\
         Please coordinate with the donor for the blood donation. \
         The blood bank staff will facilitate the process.\n\n\
         Thank you for using our service!\n\n{SIGNATURE}",
        request.blood_group,
        request.quantity,
        request.urgency,
        message.unwrap_or("No additional message"),
    )
}

pub(crate) fn accept_sms(request: &BloodRequest, quantity_offered: u32, donor_phone: &str) -> String {
    format!(
        "Great news! Donor found for your {} blood request. {quantity_offered}ml offered. \
         Contact: {donor_phone}",
        request.blood_group
    )
}

pub(crate) fn decline_email(requester: &str, message: Option<&str>) -> String {
    format!(
        "Dear {requester},\n\n\
         A donor has responded to your blood request but is unable to donate at this time.\n\n\
         DONOR MESSAGE:\n{}\n\n\
         Don't worry - we are still searching for other compatible donors for your request.\n\n\
         {SIGNATURE}",
        message.unwrap_or("No message provided"),
    )
}

pub(crate) fn decline_sms(request: &BloodRequest) -> String {
    format!(
        "Update on your {} blood request. Still searching for donors. Stay hopeful!",
        request.blood_group
    )
}
