#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]

mod convoluted_boot;
mod open_sesame;
mod reconstruction;
mod shared;
mod squatbot;
mod waiting;

use anyhow::Result;

// A round without a solution only sinks the boot key task, anything else is a bug
fn report_boot(res: Result<()>) -> Result<()> {
    match res {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<convoluted_boot::Error>() {
            Some(err @ convoluted_boot::Error::Unsatisfiable { .. }) => {
                println!("Error occurred: {}", err);
                Ok(())
            }
            _ => Err(e),
        },
    }
}

fn main() -> Result<()> {
    report_boot(convoluted_boot::recover_boot_key())?;
    waiting::print_flag()?;
    squatbot::print_message()?;
    reconstruction::print_payload();
    open_sesame::print_credentials()?;

    Ok(())
}
