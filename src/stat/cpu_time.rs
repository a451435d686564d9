use {super::*, crate::estimator::Totals, std::fmt};

/// the amount of time the system spent in each state, since boot.
///
/// this is the parsed form of the aggregate "cpu" line of `/proc/stat`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode.
    user: UserHz,
    /// time spent in user mode with low priority (nice).
    nice: UserHz,
    /// time spent in system mode.
    system: UserHz,
    /// time spent in the idle task.
    ///
    /// this value should be USER_HZ times the second entry in the /proc/uptime pseudo-file.
    idle: UserHz,
    /// time waiting for i/o to complete.
    ///
    /// see `proc_stat(5)`: this value is unreliable, and may even decrease.
    iowait: UserHz,
    /// time servicing interrupts.
    irq: UserHz,
    /// time servicing softirqs.
    softirq: UserHz,
    /// stolen time, which is the time spent in other operating systems when running in a
    /// virtualized environment.
    steal: UserHz,
    /// time spent running a virtual cpu for guest operating systems under the control of the linux
    /// kernel.
    guest: UserHz,
    /// time spent running a niced guest (virtual cpu for guest operating systems under the
    /// control of the linux kernel).
    guest_nice: UserHz,
}

/// one of the ten columns of a cpu line, in the kernel's column order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CounterField {
    User,
    Nice,
    System,
    Idle,
    IoWait,
    Irq,
    SoftIrq,
    Steal,
    Guest,
    GuestNice,
}

// === impl CounterField ===

impl CounterField {
    /// every field, in column order.
    pub const ALL: [Self; 10] = [
        Self::User,
        Self::Nice,
        Self::System,
        Self::Idle,
        Self::IoWait,
        Self::Irq,
        Self::SoftIrq,
        Self::Steal,
        Self::Guest,
        Self::GuestNice,
    ];

    /// the fields counted as busy time.
    ///
    /// guest time is already accounted for in `user` and `nice`, so it is left out.
    pub const BUSY: [Self; 6] = [
        Self::User,
        Self::Nice,
        Self::System,
        Self::Irq,
        Self::SoftIrq,
        Self::Steal,
    ];

    /// the fields counted as idle time.
    pub const IDLE: [Self; 2] = [Self::Idle, Self::IoWait];
}

// === impl CpuTime ===

impl CpuTime {
    /// returns the value of the given counter.
    pub fn get(&self, field: CounterField) -> UserHz {
        use CounterField::*;

        match field {
            User => self.user,
            Nice => self.nice,
            System => self.system,
            Idle => self.idle,
            IoWait => self.iowait,
            Irq => self.irq,
            SoftIrq => self.softirq,
            Steal => self.steal,
            Guest => self.guest,
            GuestNice => self.guest_nice,
        }
    }

    /// sums this snapshot into busy and idle totals.
    ///
    /// returns `None` if busy, idle, or their sum do not fit in 64 bits.
    pub fn totals(&self) -> Option<Totals> {
        let busy = self.checked_sum(&CounterField::BUSY)?;
        let idle = self.checked_sum(&CounterField::IDLE)?;
        busy.checked_add(idle)?;

        Some(Totals { busy, idle })
    }

    fn checked_sum(&self, fields: &[CounterField]) -> Option<UserHz> {
        fields
            .iter()
            .try_fold(UserHz::ZERO, |sum, &field| sum.checked_add(self.get(field)))
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let found = times.len();
        <_ as TryInto<[_; 10]>>::try_into(times)
            .map(Self::from)
            .map_err(|_| EntryParseError::ColumnCount { found })
    }
}

impl From<[UserHz; 10]> for CpuTime {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [UserHz; 10],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}

/// renders this snapshot as an aggregate `/proc/stat` line.
impl fmt::Display for CpuTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cpu ")?;
        for field in CounterField::ALL {
            write!(f, " {}", self.get(field))?;
        }
        Ok(())
    }
}
