//! Canned command output and configuration served in demo mode

/// `zpool iostat -ylpq 10 1` on a host with three pools
pub const DEMO_ZPOOL_IOSTAT: &str = r#"              capacity     operations     bandwidth    total_wait     disk_wait    syncq_wait    asyncq_wait  scrub   trim  rebuild  syncq_read    syncq_write   asyncq_read  asyncq_write   scrubq_read   trimq_write  rebuildq_write
pool        alloc   free   read  write   read  write   read  write   read  write   read  write   read  write   wait   wait   wait   pend  activ   pend  activ   pend  activ   pend  activ   pend  activ   pend  activ   pend  activ
----------  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----  -----
boot-pool   3087007744  27514535936      0      3      0  40960      -  214748      -  183500      -  21233      -  100663      -      -      -      0      0      0      0      0      0      0      0      0      0      0      0      0      0
data        5918927847424  2078763917312    142     87  18612224  9437184  4194304  1048576  3670016  786432  917504  131072  5242880  2097152      -      -      -      0      0      0      0      0      1      2      3      0      0      0      0      0      0
usb-backup  1099511627776  2748779069440      0      0      0      0      -      -      -      -      -      -      -      -      -      -      -      0      0      0      0      0      0      0      0      0      0      0      0      0      0
"#;

/// Agent configuration served in demo mode
pub const DEMO_AGENT_CONFIG: &str = r#"{
  "timeout": 30,
  "sampling_duration": 10
}
"#;
