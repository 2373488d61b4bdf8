//! System-call shim
//!
//! An `ecall` is dispatched on the value of register a7. Three
//! services are provided, enough to drive self-contained test
//! programs: single-character input and output, and a clean exit that
//! hands control back to the caller of the simulation. Any other
//! number is fatal.
//!
//! Two exit numbers are accepted: 3 (the bare-metal convention of the
//! test programs) and 93 (the Linux exit number riscv-gcc emits for
//! newlib's `_exit`).

use crate::hart::{Hart, StepStatus, Trap};
use crate::registers::{A0, A7};
use crate::trace::Tracer;

pub const SYS_GETCHAR: i32 = 1;
pub const SYS_PUTCHAR: i32 = 2;
pub const SYS_EXIT: i32 = 3;
pub const SYS_EXIT_LINUX: i32 = 93;

/// Dispatch the syscall selected by a7
pub fn dispatch(hart: &mut Hart, tracer: &mut Tracer) -> Result<StepStatus, Trap> {
    match hart.x(A7) {
        SYS_GETCHAR => {
            let value = hart.read_char();
            tracer.getchar(value);
            hart.set_x(A0, value);
            tracer.register_change(A0, value);
            Ok(StepStatus::Continue)
        }
        SYS_PUTCHAR => {
            let value = hart.x(A0);
            hart.write_char(value as u8);
            tracer.putchar(value);
            Ok(StepStatus::Continue)
        }
        SYS_EXIT | SYS_EXIT_LINUX => {
            tracer.exit();
            Ok(StepStatus::Exited)
        }
        number => Err(Trap::UnknownSyscall(number)),
    }
}
