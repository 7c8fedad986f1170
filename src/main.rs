#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use core::cell::RefCell;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::{P0_05, SPI2},
    spim::{self, Spim},
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embassy_sync_05::blocking_mutex::{raw::NoopRawMutex, Mutex};
use embassy_time::{Duration, Instant, Timer};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{backlight::Backlight, button::Button, display::Display, spi_flash::Flash};
use system::{
    config::SystemConfig,
    storage::{FlashSector, FlashStore},
    time::{TimeManager, TimeReference},
};

// Others
use chrono::{NaiveDateTime, Timelike};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use rand::{rngs::SmallRng, SeedableRng};
use watchface::{AccentFace, ClockStyle, FaceConfig, KeyValueStore};

// Include current UTC epoch and offset at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

const CLOCK_STYLE: ClockStyle = if cfg!(feature = "clock-12h") {
    ClockStyle::TwelveHour
} else {
    ClockStyle::TwentyFourHour
};
const BRIGHTNESS: u8 = 2;

/// Redraw interval while the panels slide in
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const IDLE_INTERVAL: Duration = Duration::from_millis(100);

type FlashSpi = SpiDevice<'static, NoopRawMutex, Spim<'static, SPI2>, Output<'static, P0_05>>;

// Communication channels
static MINUTE_TICK: Signal<ThreadModeRawMutex, NaiveDateTime> = Signal::new();
static TOGGLE_FACE: Signal<ThreadModeRawMutex, ()> = Signal::new();

/// LCD and flash share SPI2
static SPI_BUS: StaticCell<Mutex<NoopRawMutex, RefCell<Spim<'static, SPI2>>>> = StaticCell::new();

/// Signal the current time whenever the minute changes.
#[embassy_executor::task(pool_size = 1)]
async fn minute_tick(clock: TimeManager) {
    loop {
        Timer::after(clock.until_next_minute()).await;

        let now = clock.now();
        defmt::debug!("Minute tick {}:{}", now.hour(), now.minute());
        MINUTE_TICK.signal(now);
    }
}

/// Toggle the watch face on every button press.
#[embassy_executor::task(pool_size = 1)]
async fn poll_button(mut button: Button) {
    loop {
        button.wait_for_press().await;
        defmt::info!("Button pressed");
        TOGGLE_FACE.signal(());
    }
}

/// Run the watch face: start on boot, stop and store on a button press,
/// start again on the next one.
#[embassy_executor::task(pool_size = 1)]
async fn run_face(
    mut display: Display,
    mut backlight: Backlight,
    mut store: FlashStore<FlashSpi>,
    clock: TimeManager,
) {
    let config = FaceConfig {
        clock_style: CLOCK_STYLE,
        ..FaceConfig::default()
    };
    let mut face = Some(start_face(config, &clock, &mut store, &mut backlight));
    let mut last_frame = Instant::now();

    loop {
        if TOGGLE_FACE.try_take().is_some() {
            match face.take() {
                Some(running) => {
                    unwrap!(running.on_stop(&mut store));
                    backlight.off();
                    unwrap!(display.clear(Rgb565::BLACK));
                    defmt::info!("Watch face stopped");
                }
                None => {
                    face = Some(start_face(config, &clock, &mut store, &mut backlight));
                    last_frame = Instant::now();
                }
            }
        }

        let tick = MINUTE_TICK.try_take();
        let Some(running) = face.as_mut() else {
            // Ticks while stopped are dropped
            Timer::after(IDLE_INTERVAL).await;
            continue;
        };

        let mut redraw = false;
        if let Some(now) = tick {
            let outcome = running.on_minute_tick(&now);
            if outcome.recolored {
                defmt::info!("New day, new color {}", running.color());
            }
            redraw = true;
        }
        if running.is_animating() {
            let now = Instant::now();
            running.advance_animation((now - last_frame).as_millis() as u32);
            last_frame = now;
            redraw = true;
        }
        if redraw {
            unwrap!(display.draw_face(running));
        }

        Timer::after(if running.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        })
        .await;
    }
}

/// Start the face with a freshly seeded random source and light up the screen.
fn start_face<S>(
    config: FaceConfig,
    clock: &TimeManager,
    store: &mut S,
    backlight: &mut Backlight,
) -> AccentFace<SmallRng>
where
    S: KeyValueStore,
    S::Error: defmt::Format,
{
    let now = clock.now();
    let seed = (now.and_utc().timestamp() as u64) ^ Instant::now().as_ticks();
    let face = unwrap!(AccentFace::on_start(
        config,
        SmallRng::seed_from_u64(seed),
        &now,
        store
    ));
    defmt::info!("Watch face started: {} {}", face.time_text(), face.date_text());

    if backlight.get_brightness() == 0 {
        backlight.set(BRIGHTNESS);
    }
    face
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(SystemConfig::new());
    defmt::info!("Initializing");

    let clock = TimeManager::init(TimeReference::from_timestamp(UTC_TIME, UTC_OFFSET));

    // Initialize Backlight, off until the face has something to show
    let backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        0,
    );

    // Initialize Button
    let button = Button::init(
        Input::new(p.P0_13, Pull::None),
        Output::new(p.P0_15, Level::Low, OutputDrive::Standard),
    );

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);
    let spi_bus = SPI_BUS.init(Mutex::new(RefCell::new(spim)));

    // Initialize LCD
    let display = unwrap!(Display::init(
        SpiDevice::new(
            spi_bus,
            Output::new(p.P0_25, Level::High, OutputDrive::Standard)
        ),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
    ));

    // Initialize flash storage
    let flash = Flash::init(SpiDevice::new(
        spi_bus,
        Output::new(p.P0_05, Level::High, OutputDrive::Standard),
    ));
    let store = unwrap!(FlashStore::open(FlashSector::new(flash)));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(poll_button(button)));
    unwrap!(spawner.spawn(minute_tick(clock)));
    unwrap!(spawner.spawn(run_face(display, backlight, store, clock)));
}
