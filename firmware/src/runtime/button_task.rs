use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};

use crate::board::BUTTON_DEBOUNCE_MS;
use crate::events::{self, ButtonLine, FaceSender};

#[embassy_executor::task(pool_size = 3)]
pub async fn run(line: ButtonLine, mut input: ExtiInput<'static>, sender: FaceSender<'static>) -> ! {
    let mut pressed = input.is_high();
    loop {
        if pressed {
            input.wait_for_falling_edge().await;
        } else {
            input.wait_for_rising_edge().await;
        }
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        let level = input.is_high();
        if level == pressed {
            continue;
        }
        pressed = level;

        if !events::button_level_changed(&sender, line, pressed) {
            defmt::warn!("buttons: {} release dropped, queue full", line.label());
        }
    }
}
