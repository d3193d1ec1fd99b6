//! Domain services, one per record family.
//!
//! Services validate a request, perform the store operations, and join
//! (populate) referenced records into the view the API returns. They hold an
//! `Arc<Store>` (and configuration where needed) and no other state.

pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod medicines;
pub mod messages;
pub mod patients;
pub mod prescriptions;
pub mod scheduling;

pub use appointments::AppointmentService;
pub use auth::AuthService;
pub use doctors::DoctorService;
pub use medicines::MedicineService;
pub use messages::MessageService;
pub use patients::PatientService;
pub use prescriptions::PrescriptionService;

use crate::models::{
    Appointment, AppointmentDetail, Doctor, DoctorProfile, Message, MessageDetail, Patient,
    PatientProfile, Prescription, PrescriptionDetail,
};
use crate::store::Store;
use crate::ClinicResult;

/// Joins a doctor with its user record. `None` if the user is gone.
pub(crate) fn doctor_profile(store: &Store, doctor: Doctor) -> ClinicResult<Option<DoctorProfile>> {
    Ok(store
        .users
        .get(doctor.user_id)?
        .map(|user| DoctorProfile {
            doctor,
            user: user.to_public(),
        }))
}

/// Joins a patient with its user record. `None` if the user is gone.
pub(crate) fn patient_profile(
    store: &Store,
    patient: Patient,
) -> ClinicResult<Option<PatientProfile>> {
    Ok(store
        .users
        .get(patient.user_id)?
        .map(|user| PatientProfile {
            patient,
            user: user.to_public(),
        }))
}

/// Joins an appointment with both parties. Dangling references populate as
/// `None` rather than failing the whole listing.
pub(crate) fn appointment_detail(
    store: &Store,
    appointment: Appointment,
) -> ClinicResult<AppointmentDetail> {
    let patient = match store.patients.get(appointment.patient_id)? {
        Some(patient) => patient_profile(store, patient)?,
        None => None,
    };
    let doctor = match store.doctors.get(appointment.doctor_id)? {
        Some(doctor) => doctor_profile(store, doctor)?,
        None => None,
    };

    Ok(AppointmentDetail {
        appointment,
        patient,
        doctor,
    })
}

pub(crate) fn prescription_detail(
    store: &Store,
    prescription: Prescription,
) -> ClinicResult<PrescriptionDetail> {
    let doctor = match store.doctors.get(prescription.doctor_id)? {
        Some(doctor) => doctor_profile(store, doctor)?,
        None => None,
    };
    let patient = match store.patients.get(prescription.patient_id)? {
        Some(patient) => patient_profile(store, patient)?,
        None => None,
    };

    Ok(PrescriptionDetail {
        prescription,
        doctor,
        patient,
    })
}

pub(crate) fn message_detail(store: &Store, message: Message) -> ClinicResult<MessageDetail> {
    let sender = store.users.get(message.sender_id)?.map(|u| u.to_public());
    let receiver = store.users.get(message.receiver_id)?.map(|u| u.to_public());

    Ok(MessageDetail {
        message,
        sender,
        receiver,
    })
}

/// Chronological ordering for appointment listings: date, then time of day.
pub(crate) fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| (a.appointment_date, a.appointment_time));
}
